//! Meetings, webinars, classroom sessions, and batches.

use super::{impl_entity, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    #[default]
    Meeting,
    Webinar,
    Interview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: MeetingKind,
    pub host_id: EntityId,
    #[serde(default)]
    pub participants: Vec<EntityId>,
    /// Unix epoch milliseconds.
    pub start_at: i64,
    #[serde(default)]
    pub end_at: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    pub created_at: i64,
}

impl_entity!(Meeting, "lms_meetings");

impl Meeting {
    pub fn involves(&self, user_id: &str) -> bool {
        self.host_id == user_id || self.participants.iter().any(|id| id == user_id)
    }
}

/// Input for scheduling a meeting, webinar, or interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub title: String,
    pub description: String,
    pub kind: MeetingKind,
    pub host_id: EntityId,
    pub participants: Vec<EntityId>,
    pub start_at: i64,
    pub end_at: Option<i64>,
    pub link: Option<String>,
}

impl NewMeeting {
    pub fn new(
        title: impl Into<String>,
        kind: MeetingKind,
        host_id: impl Into<EntityId>,
        start_at: i64,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            kind,
            host_id: host_id.into(),
            participants: Vec::new(),
            start_at,
            end_at: None,
            link: None,
        }
    }

    pub fn into_meeting(self) -> Meeting {
        Meeting {
            id: EntityId::new(),
            title: self.title,
            description: self.description,
            kind: self.kind,
            host_id: self.host_id,
            participants: self.participants,
            start_at: self.start_at,
            end_at: self.end_at,
            link: self.link,
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomSession {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub course_id: Option<EntityId>,
    pub instructor_id: EntityId,
    #[serde(default)]
    pub batch_id: Option<EntityId>,
    #[serde(default)]
    pub location: String,
    pub start_at: i64,
    #[serde(default)]
    pub end_at: Option<i64>,
    #[serde(default)]
    pub attendees: Vec<EntityId>,
    pub created_at: i64,
}

impl_entity!(ClassroomSession, "lms_classroom_sessions");

impl ClassroomSession {
    pub fn new(
        title: impl Into<String>,
        instructor_id: impl Into<EntityId>,
        location: impl Into<String>,
        start_at: i64,
    ) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            course_id: None,
            instructor_id: instructor_id.into(),
            batch_id: None,
            location: location.into(),
            start_at,
            end_at: None,
            attendees: Vec::new(),
            created_at: 0,
        }
    }
}

/// A cohort of users taking the same courses together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<EntityId>,
    #[serde(default)]
    pub course_ids: Vec<EntityId>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
    pub created_at: i64,
}

impl_entity!(Batch, "lms_batches");

impl Batch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: String::new(),
            members: Vec::new(),
            course_ids: Vec::new(),
            start_date: None,
            end_date: None,
            created_at: 0,
        }
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|id| id == user_id)
    }
}
