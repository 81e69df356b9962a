//! Demo data loaded into an empty store on first start.

use crate::model::communication::Announcement;
use crate::model::course::{Course, CourseStatus, LessonKind, NewCourse, NewLesson};
use crate::model::engagement::Badge;
use crate::model::now_epoch_ms;
use crate::model::schedule::{Batch, MeetingKind, NewMeeting};
use crate::model::user::{NewUser, User, UserRole};
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::info;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Seeds demo records unless users already exist.
///
/// Returns `true` when data was written.
pub fn seed_demo_data<B: StorageBackend>(store: &LmsStore<B>) -> RepoResult<bool> {
    if !store.collection::<User>().is_empty()? {
        return Ok(false);
    }

    let users = store.users();
    let admin = users.create_user(staff("Morgan Admin", "admin@lms.test", UserRole::Admin, "IT"))?;
    let hr = users.create_user(staff("Riley Hr", "hr@lms.test", UserRole::Hr, "People"))?;
    let ana = users.create_user(staff("Ana Employee", "ana@lms.test", UserRole::Employee, "Finance"))?;
    let ben = users.create_user(staff("Ben Employee", "ben@lms.test", UserRole::Employee, "Sales"))?;
    let cara = users.create_user(NewUser::new("Cara Candidate", "cara@lms.test", UserRole::Candidate))?;

    let courses = store.courses();
    let mut onboarding = NewCourse::new("Company Onboarding", "onboarding");
    onboarding.description = "Policies, tools, and people you will work with.".to_string();
    onboarding.instructor = hr.name.clone();
    onboarding.status = CourseStatus::Published;
    onboarding.lessons = vec![
        NewLesson::new("Welcome", LessonKind::Video, 10),
        NewLesson::new("Code of conduct", LessonKind::Reading, 20),
        NewLesson::new("Onboarding quiz", LessonKind::Quiz, 10),
    ];
    let onboarding = courses.create_course(onboarding)?;

    let mut security = NewCourse::new("Security Awareness", "compliance");
    security.description = "Recognize phishing and protect company data.".to_string();
    security.instructor = admin.name.clone();
    security.status = CourseStatus::Published;
    security.lessons = vec![
        NewLesson::new("Passwords and MFA", LessonKind::Video, 15),
        NewLesson::new("Spotting phishing", LessonKind::Quiz, 15),
    ];
    let security = courses.create_course(security)?;

    let employees = vec![ana.id.clone(), ben.id.clone()];
    courses.assign_course(&onboarding.id, &employees)?;
    courses.assign_course(&security.id, &[ana.id.clone()])?;

    let engagement = store.engagement();
    let mut first_steps = Badge::new("First Steps", "footprints", 10);
    first_steps.criteria = Some("Complete your first lesson".to_string());
    engagement.create_badge(first_steps)?;
    let mut finisher = Badge::new("Course Finisher", "trophy", 50);
    finisher.criteria = Some("Complete any course".to_string());
    engagement.create_badge(finisher)?;

    let mut welcome = Announcement::new(&hr.id, "Welcome to the LMS", "Start with Company Onboarding.");
    welcome.pinned = true;
    store.messaging().publish_announcement(welcome)?;

    let schedule = store.schedule();
    let mut cohort = Batch::new("Q1 Cohort");
    cohort.course_ids = vec![onboarding.id.clone()];
    let cohort = schedule.create_batch(cohort)?;
    schedule.add_batch_members(&cohort.id, &employees)?;

    let now = now_epoch_ms();
    let mut webinar = NewMeeting::new("Learning at Work", MeetingKind::Webinar, &hr.id, now + 7 * DAY_MS);
    webinar.participants = employees.clone();
    schedule.schedule_meeting(webinar)?;
    let mut interview = NewMeeting::new("Interview", MeetingKind::Interview, &hr.id, now + 2 * DAY_MS);
    interview.participants = vec![cara.id.clone()];
    schedule.schedule_meeting(interview)?;

    store.theme().update_theme(|_| {})?;

    info!(
        "event=seed_demo module=seed status=ok users={} courses={}",
        store.collection::<User>().count()?,
        store.collection::<Course>().count()?
    );
    Ok(true)
}

fn staff(name: &str, email: &str, role: UserRole, department: &str) -> NewUser {
    let mut user = NewUser::new(name, email, role);
    user.department = Some(department.to_string());
    user
}

#[cfg(test)]
mod tests {
    use super::seed_demo_data;
    use crate::model::collection_keys;
    use crate::model::user::UserRole;
    use crate::storage::StorageBackend;
    use crate::store::LmsStore;

    #[test]
    fn seeds_once() {
        let store = LmsStore::in_memory();
        assert!(seed_demo_data(&store).unwrap());
        let user_count = store.users().list_users().unwrap().len();
        assert!(!seed_demo_data(&store).unwrap());
        assert_eq!(store.users().list_users().unwrap().len(), user_count);
    }

    #[test]
    fn seed_covers_every_role() {
        let store = LmsStore::in_memory();
        seed_demo_data(&store).unwrap();
        for role in UserRole::ALL {
            assert!(
                !store.users().users_by_role(role).unwrap().is_empty(),
                "missing seeded {role}"
            );
        }
        assert_eq!(store.schedule().webinars().unwrap().len(), 1);
    }

    #[test]
    fn seed_writes_only_known_keys() {
        let store = LmsStore::in_memory();
        seed_demo_data(&store).unwrap();

        let known = collection_keys();
        for key in store.backend().keys().unwrap() {
            assert!(known.contains(&key.as_str()), "unexpected key {key}");
        }
    }
}
