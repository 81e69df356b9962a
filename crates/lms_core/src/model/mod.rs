//! LMS entity records.
//!
//! # Responsibility
//! - Define the plain records persisted as JSON arrays, one key per type.
//! - Provide the identity contract (`id`, `createdAt`) shared by all of them.
//!
//! # Invariants
//! - Relationships are id strings only; nothing here enforces them.
//! - Serialized field names are camelCase so stored documents keep the
//!   layout existing browser data uses.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod assessment;
pub mod communication;
pub mod course;
pub mod engagement;
pub mod id;
pub mod schedule;
pub mod theme;
pub mod user;

/// Timestamp-derived string id shared by every entity.
pub type EntityId = String;

/// A record stored in its own collection key.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Storage key holding the JSON array of this entity type.
    const KEY: &'static str;

    fn id(&self) -> &str;

    /// Stamps identity onto a freshly built record before it is appended.
    fn assign_identity(&mut self, id: EntityId, created_at: i64);
}

macro_rules! impl_entity {
    ($ty:ty, $key:literal) => {
        impl $crate::model::Entity for $ty {
            const KEY: &'static str = $key;

            fn id(&self) -> &str {
                &self.id
            }

            fn assign_identity(&mut self, id: $crate::model::EntityId, created_at: i64) {
                self.id = id;
                self.created_at = created_at;
            }
        }
    };
}

pub(crate) use impl_entity;

/// Current wall clock in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// Every collection key the store writes, in a stable order.
pub fn collection_keys() -> [&'static str; 15] {
    [
        user::User::KEY,
        course::Course::KEY,
        course::LearningObject::KEY,
        schedule::Meeting::KEY,
        schedule::ClassroomSession::KEY,
        schedule::Batch::KEY,
        communication::Message::KEY,
        communication::Announcement::KEY,
        communication::Notification::KEY,
        communication::Email::KEY,
        engagement::Badge::KEY,
        engagement::Activity::KEY,
        assessment::Form::KEY,
        assessment::Evaluation::KEY,
        theme::THEME_KEY,
    ]
}
