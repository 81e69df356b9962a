//! Role dashboards: read-only summaries derived from the collections.
//!
//! Percentages are plain ratios; a course is complete at `progress >= 100`.

use crate::model::assessment::{Evaluation, EvaluationStatus};
use crate::model::course::{Course, CourseStatus};
use crate::model::now_epoch_ms;
use crate::model::schedule::MeetingKind;
use crate::model::user::{User, UserRole};
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDashboard {
    pub user: User,
    pub assigned_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    /// Mean progress over assigned courses; 0 with no assignments.
    pub average_progress: f64,
    pub points: u32,
    pub badge_count: usize,
    pub unread_messages: usize,
    pub unread_notifications: usize,
    pub upcoming_meetings: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDashboard {
    pub user: User,
    pub pending_evaluations: usize,
    pub submitted_evaluations: usize,
    pub average_score: Option<f64>,
    pub upcoming_interviews: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HrOverview {
    pub total_users: usize,
    pub admins: usize,
    pub hr: usize,
    pub employees: usize,
    pub candidates: usize,
    pub total_courses: usize,
    pub published_courses: usize,
    /// Completed (course, assignee) pairs over all pairs, in percent.
    pub completion_rate: f64,
    pub pending_evaluations: usize,
}

pub struct DashboardService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> DashboardService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn employee_dashboard(&self, user_id: &str) -> RepoResult<Option<EmployeeDashboard>> {
        self.employee_dashboard_at(user_id, now_epoch_ms())
    }

    /// Same as `employee_dashboard` with an explicit "now" for meeting cutoffs.
    pub fn employee_dashboard_at(
        &self,
        user_id: &str,
        now: i64,
    ) -> RepoResult<Option<EmployeeDashboard>> {
        let Some(user) = self.store.users().get_user(user_id)? else {
            return Ok(None);
        };
        let courses = self.store.courses().courses_for_user(user_id)?;
        let completed = courses
            .iter()
            .filter(|course| course.is_completed_by(user_id))
            .count();
        let in_progress = courses
            .iter()
            .filter(|course| {
                let progress = course.progress_for(user_id);
                progress > 0 && !course.is_completed_by(user_id)
            })
            .count();
        let average_progress = mean(courses.iter().map(|course| f64::from(course.progress_for(user_id))));
        let messaging = self.store.messaging();

        Ok(Some(EmployeeDashboard {
            assigned_courses: courses.len(),
            completed_courses: completed,
            in_progress_courses: in_progress,
            average_progress,
            points: user.points,
            badge_count: user.badges.len(),
            unread_messages: messaging.unread_count(user_id)?,
            unread_notifications: messaging.unread_notification_count(user_id)?,
            upcoming_meetings: self.store.schedule().upcoming_meetings(user_id, now)?.len(),
            user,
        }))
    }

    pub fn candidate_dashboard(&self, user_id: &str) -> RepoResult<Option<CandidateDashboard>> {
        self.candidate_dashboard_at(user_id, now_epoch_ms())
    }

    pub fn candidate_dashboard_at(
        &self,
        user_id: &str,
        now: i64,
    ) -> RepoResult<Option<CandidateDashboard>> {
        let Some(user) = self.store.users().get_user(user_id)? else {
            return Ok(None);
        };
        let assessments = self.store.assessments();
        let evaluations = assessments.evaluations_for_user(user_id)?;
        let pending = evaluations
            .iter()
            .filter(|evaluation| evaluation.status == EvaluationStatus::Pending)
            .count();
        let interviews = self
            .store
            .schedule()
            .upcoming_meetings(user_id, now)?
            .into_iter()
            .filter(|meeting| meeting.kind == MeetingKind::Interview)
            .count();

        Ok(Some(CandidateDashboard {
            pending_evaluations: pending,
            submitted_evaluations: evaluations.len() - pending,
            average_score: assessments.average_score(user_id)?,
            upcoming_interviews: interviews,
            user,
        }))
    }

    pub fn hr_overview(&self) -> RepoResult<HrOverview> {
        let users = self.store.collection::<User>().load_all()?;
        let courses = self.store.collection::<Course>().load_all()?;
        let pending_evaluations = self
            .store
            .collection::<Evaluation>()
            .filter(|evaluation| evaluation.status == EvaluationStatus::Pending)?
            .len();

        let count_role = |role: UserRole| users.iter().filter(|user| user.role == role).count();
        let pairs = courses
            .iter()
            .map(|course| course.assigned_to.len())
            .sum::<usize>();
        let completed_pairs = courses
            .iter()
            .map(|course| {
                course
                    .assigned_to
                    .iter()
                    .filter(|user_id| course.is_completed_by(user_id))
                    .count()
            })
            .sum::<usize>();

        Ok(HrOverview {
            total_users: users.len(),
            admins: count_role(UserRole::Admin),
            hr: count_role(UserRole::Hr),
            employees: count_role(UserRole::Employee),
            candidates: count_role(UserRole::Candidate),
            total_courses: courses.len(),
            published_courses: courses
                .iter()
                .filter(|course| course.status == CourseStatus::Published)
                .count(),
            completion_rate: percent(completed_pairs, pairs),
            pending_evaluations,
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::{mean, percent};

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(percent(3, 0), 0.0);
    }

    #[test]
    fn ratios_are_percentages() {
        assert_eq!(mean([50.0, 100.0].into_iter()), 75.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
