//! Badges and the activity feed.

use super::{impl_entity, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Points granted the first time a user earns this badge.
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub criteria: Option<String>,
    pub created_at: i64,
}

impl_entity!(Badge, "lms_badges");

impl Badge {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, points: u32) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: String::new(),
            icon: icon.into(),
            points,
            criteria: None,
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Login,
    CourseAssigned,
    LessonCompleted,
    CourseCompleted,
    BadgeEarned,
    EvaluationSubmitted,
    MessageSent,
    MeetingScheduled,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: EntityId,
    pub user_id: EntityId,
    pub kind: ActivityKind,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
}

impl_entity!(Activity, "lms_activities");
