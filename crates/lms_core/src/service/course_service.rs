//! Course catalog, assignment, and progress tracking.
//!
//! # Invariants
//! - `assignedTo` never gains a duplicate id through this service.
//! - Lesson completion is recorded at most once per user.
//! - Progress is recomputed from lessons whenever a lesson is completed.

use crate::model::course::{Course, CourseStatus, LearningObject, NewCourse, COMPLETE_PERCENT};
use crate::model::engagement::ActivityKind;
use crate::repo::filter::{eq_ignore_case, matches_text, push_unique};
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::info;

pub struct CourseService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> CourseService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    /// Creates a course; lesson ids are `<courseId>-<n>` starting at 1.
    pub fn create_course(&self, new_course: NewCourse) -> RepoResult<Course> {
        let course = self.store.create(new_course.into_course())?;
        info!(
            "event=course_create module=service status=ok course_id={} lessons={}",
            course.id,
            course.lessons.len()
        );
        Ok(course)
    }

    pub fn get_course(&self, id: &str) -> RepoResult<Option<Course>> {
        self.store.collection::<Course>().get(id)
    }

    pub fn list_courses(&self) -> RepoResult<Vec<Course>> {
        self.store.collection::<Course>().load_all()
    }

    pub fn published_courses(&self) -> RepoResult<Vec<Course>> {
        self.store
            .collection::<Course>()
            .filter(|course| course.status == CourseStatus::Published)
    }

    pub fn update_course(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut Course),
    ) -> RepoResult<Option<Course>> {
        self.store.collection::<Course>().update(id, mutate)
    }

    pub fn delete_course(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Course>().delete(id)
    }

    /// Text match on title, description, instructor; optional category filter.
    pub fn search_courses(&self, text: &str, category: Option<&str>) -> RepoResult<Vec<Course>> {
        self.store.collection::<Course>().filter(|course| {
            let category_ok = category.map_or(true, |wanted| eq_ignore_case(&course.category, wanted));
            category_ok
                && matches_text(
                    text,
                    [
                        course.title.as_str(),
                        course.description.as_str(),
                        course.instructor.as_str(),
                    ],
                )
        })
    }

    /// Exactly the courses whose `assignedTo` contains `user_id`.
    pub fn courses_for_user(&self, user_id: &str) -> RepoResult<Vec<Course>> {
        self.store
            .collection::<Course>()
            .filter(|course| course.is_assigned_to(user_id))
    }

    /// Adds users to `assignedTo`; only newly added users are notified.
    pub fn assign_course(&self, course_id: &str, user_ids: &[String]) -> RepoResult<Option<Course>> {
        let mut added = Vec::new();
        let updated = self.update_course(course_id, |course| {
            for user_id in user_ids {
                if push_unique(&mut course.assigned_to, user_id) {
                    added.push(user_id.clone());
                }
            }
        })?;
        let Some(course) = updated else {
            return Ok(None);
        };

        for user_id in &added {
            self.store.engagement().log_activity(
                user_id,
                ActivityKind::CourseAssigned,
                format!("Assigned to {}", course.title),
            )?;
            self.store.messaging().notify(
                user_id,
                "New course assigned",
                format!("You have been enrolled in {}.", course.title),
                Some(format!("/courses/{}", course.id)),
            )?;
        }
        info!(
            "event=course_assign module=service status=ok course_id={} added={}",
            course.id,
            added.len()
        );
        Ok(Some(course))
    }

    /// Removes a user from `assignedTo` and drops their progress entry.
    pub fn unassign_course(&self, course_id: &str, user_id: &str) -> RepoResult<Option<Course>> {
        self.update_course(course_id, |course| {
            course.assigned_to.retain(|id| id != user_id);
            course.progress.remove(user_id);
        })
    }

    /// Records one lesson completion and recomputes that user's progress.
    ///
    /// Returns `None` when the course does not exist. An unknown lesson id
    /// leaves the course unchanged.
    pub fn complete_lesson(
        &self,
        course_id: &str,
        lesson_id: &str,
        user_id: &str,
    ) -> RepoResult<Option<Course>> {
        let mut lesson_title = None;
        let mut was_complete = false;
        let updated = self.update_course(course_id, |course| {
            was_complete = course.is_completed_by(user_id);
            if let Some(lesson) = course.lessons.iter_mut().find(|lesson| lesson.id == lesson_id) {
                if push_unique(&mut lesson.completed_by, user_id) {
                    lesson_title = Some(lesson.title.clone());
                }
                course.recompute_progress(user_id);
            }
        })?;
        let Some(course) = updated else {
            return Ok(None);
        };

        let engagement = self.store.engagement();
        if let Some(title) = lesson_title {
            engagement.log_activity(
                user_id,
                ActivityKind::LessonCompleted,
                format!("Completed lesson {title}"),
            )?;
        }
        if !was_complete && course.is_completed_by(user_id) {
            engagement.log_activity(
                user_id,
                ActivityKind::CourseCompleted,
                format!("Completed course {}", course.title),
            )?;
        }
        Ok(Some(course))
    }

    /// Overrides a user's progress, clamped to 100.
    pub fn set_progress(
        &self,
        course_id: &str,
        user_id: &str,
        percent: u8,
    ) -> RepoResult<Option<Course>> {
        self.update_course(course_id, |course| {
            course
                .progress
                .insert(user_id.to_string(), percent.min(COMPLETE_PERCENT));
        })
    }

    pub fn add_learning_object(&self, object: LearningObject) -> RepoResult<LearningObject> {
        self.store.create(object)
    }

    pub fn learning_objects_for_course(&self, course_id: &str) -> RepoResult<Vec<LearningObject>> {
        self.store
            .collection::<LearningObject>()
            .filter(|object| object.course_id.as_deref() == Some(course_id))
    }

    pub fn delete_learning_object(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<LearningObject>().delete(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::course::{CourseStatus, LessonKind, NewCourse, NewLesson};
    use crate::model::engagement::ActivityKind;
    use crate::store::LmsStore;

    fn course_with_lessons(store: &LmsStore<crate::storage::MemoryStorage>) -> crate::model::course::Course {
        let mut new_course = NewCourse::new("Security basics", "compliance");
        new_course.status = CourseStatus::Published;
        new_course.lessons = vec![
            NewLesson::new("Passwords", LessonKind::Video, 10),
            NewLesson::new("Phishing", LessonKind::Quiz, 15),
        ];
        store.courses().create_course(new_course).unwrap()
    }

    #[test]
    fn lesson_ids_derive_from_course_id() {
        let store = LmsStore::in_memory();
        let course = course_with_lessons(&store);
        assert_eq!(course.lessons[0].id, format!("{}-1", course.id));
        assert_eq!(course.lessons[1].id, format!("{}-2", course.id));

        let stored = store.courses().get_course(&course.id).unwrap().unwrap();
        assert_eq!(stored.lessons, course.lessons);
    }

    #[test]
    fn assign_is_deduplicated_and_notifies_once() {
        let store = LmsStore::in_memory();
        let course = course_with_lessons(&store);
        let ids = vec!["u1".to_string(), "u1".to_string(), "u2".to_string()];

        store.courses().assign_course(&course.id, &ids).unwrap();
        let again = store
            .courses()
            .assign_course(&course.id, &["u1".to_string()])
            .unwrap()
            .unwrap();

        assert_eq!(again.assigned_to, vec!["u1", "u2"]);
        assert_eq!(store.messaging().notifications_for("u1").unwrap().len(), 1);
        assert!(store.courses().assign_course("missing", &ids).unwrap().is_none());
    }

    #[test]
    fn completing_every_lesson_completes_the_course() {
        let store = LmsStore::in_memory();
        let course = course_with_lessons(&store);
        let courses = store.courses();

        let half = courses
            .complete_lesson(&course.id, &course.lessons[0].id, "u1")
            .unwrap()
            .unwrap();
        assert_eq!(half.progress_for("u1"), 50);

        courses
            .complete_lesson(&course.id, &course.lessons[0].id, "u1")
            .unwrap();
        let done = courses
            .complete_lesson(&course.id, &course.lessons[1].id, "u1")
            .unwrap()
            .unwrap();
        assert!(done.is_completed_by("u1"));
        assert_eq!(done.lessons[0].completed_by, vec!["u1"]);

        let kinds = store
            .engagement()
            .recent_activities("u1", 10)
            .unwrap()
            .into_iter()
            .map(|activity| activity.kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds.len(), 3, "two lessons plus one course completion");
        let completions = |kinds: &[ActivityKind]| {
            kinds
                .iter()
                .filter(|kind| **kind == ActivityKind::CourseCompleted)
                .count()
        };
        assert_eq!(completions(&kinds), 1);

        courses
            .complete_lesson(&course.id, &course.lessons[1].id, "u1")
            .unwrap();
        let again = store
            .engagement()
            .recent_activities("u1", 10)
            .unwrap()
            .into_iter()
            .map(|activity| activity.kind)
            .collect::<Vec<_>>();
        assert_eq!(completions(&again), 1, "already complete; no second completion");
    }

    #[test]
    fn set_progress_clamps_and_unassign_clears_it() {
        let store = LmsStore::in_memory();
        let course = course_with_lessons(&store);
        let courses = store.courses();
        courses.assign_course(&course.id, &["u1".to_string()]).unwrap();

        let updated = courses.set_progress(&course.id, "u1", 250).unwrap().unwrap();
        assert_eq!(updated.progress_for("u1"), 100);

        let cleared = courses.unassign_course(&course.id, "u1").unwrap().unwrap();
        assert!(cleared.assigned_to.is_empty());
        assert_eq!(cleared.progress_for("u1"), 0);
    }

    #[test]
    fn search_filters_by_text_and_category() {
        let store = LmsStore::in_memory();
        course_with_lessons(&store);
        let mut other = NewCourse::new("Security for managers", "leadership");
        other.instructor = "Dana".to_string();
        store.courses().create_course(other).unwrap();

        assert_eq!(store.courses().search_courses("security", None).unwrap().len(), 2);
        assert_eq!(
            store
                .courses()
                .search_courses("security", Some("Compliance"))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.courses().search_courses("dana", None).unwrap().len(), 1);
        assert_eq!(store.courses().published_courses().unwrap().len(), 1);
    }
}
