//! Core of the LMS: entity store, domain services, and mail delivery.
//!
//! Every dashboard operation reads and writes whole entity collections through
//! [`LmsStore`]; persistence is pluggable via [`StorageBackend`].

pub mod config;
pub mod db;
pub mod logging;
pub mod mail;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod storage;
pub mod store;

pub use config::{AppConfig, BackendKind, ConfigError, LoggingConfig, MailConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use mail::template::{placeholders, render_template};
pub use mail::{
    send_batch, send_to_recipients, BatchOutcome, HttpMailTransport, MailError, MailReceipt,
    MailRequest, MailTransport,
};
pub use model::assessment::{
    Evaluation, EvaluationStatus, FieldKind, Form, FormField, NewEvaluation,
};
pub use model::communication::{Announcement, Email, EmailStatus, Message, Notification};
pub use model::course::{
    Course, CourseStatus, LearningObject, LearningObjectKind, Lesson, LessonKind, NewCourse,
    NewLesson,
};
pub use model::engagement::{Activity, ActivityKind, Badge};
pub use model::id::IdGenerator;
pub use model::schedule::{Batch, ClassroomSession, Meeting, MeetingKind, NewMeeting};
pub use model::theme::ThemeSettings;
pub use model::user::{NewUser, User, UserRole, UserStatus};
pub use model::{Entity, EntityId};
pub use repo::{CollectionRepository, RepoError, RepoResult};
pub use seed::seed_demo_data;
pub use service::dashboard_service::{CandidateDashboard, EmployeeDashboard, HrOverview};
pub use service::messaging_service::{EmailDispatchError, EmailDraft};
pub use storage::{MemoryStorage, SqliteStorage, StorageBackend, StorageError};
pub use store::LmsStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
