//! Messages, announcements, notifications, and sent-email records.

use super::user::UserRole;
use super::{impl_entity, EntityId};
use serde::{Deserialize, Serialize};

/// Direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: EntityId,
    pub sender_id: EntityId,
    pub recipient_id: EntityId,
    #[serde(default)]
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: i64,
}

impl_entity!(Message, "lms_messages");

impl Message {
    pub fn new(
        sender_id: impl Into<EntityId>,
        recipient_id: impl Into<EntityId>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            subject: subject.into(),
            body: body.into(),
            read: false,
            created_at: 0,
        }
    }
}

/// Broadcast post shown on dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: EntityId,
    pub title: String,
    pub body: String,
    pub author_id: EntityId,
    /// Roles that see this post; empty means everyone.
    #[serde(default)]
    pub audience: Vec<UserRole>,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: i64,
}

impl_entity!(Announcement, "lms_announcements");

impl Announcement {
    pub fn new(
        author_id: impl Into<EntityId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            body: body.into(),
            author_id: author_id.into(),
            audience: Vec::new(),
            pinned: false,
            created_at: 0,
        }
    }

    pub fn is_visible_to(&self, role: UserRole) -> bool {
        self.audience.is_empty() || self.audience.contains(&role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: i64,
}

impl_entity!(Notification, "lms_notifications");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Sent,
    Failed,
}

/// One delivery attempt to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EntityId,
    pub to: String,
    pub subject: String,
    pub html_content: String,
    pub sender_id: String,
    pub status: EmailStatus,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub pixel_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub opened: bool,
    pub created_at: i64,
}

impl_entity!(Email, "lms_emails");

#[cfg(test)]
mod tests {
    use super::Announcement;
    use crate::model::user::UserRole;

    #[test]
    fn empty_audience_is_visible_to_every_role() {
        let mut post = Announcement::new("1", "Hello", "Body");
        assert!(UserRole::ALL.iter().all(|role| post.is_visible_to(*role)));

        post.audience = vec![UserRole::Employee];
        assert!(post.is_visible_to(UserRole::Employee));
        assert!(!post.is_visible_to(UserRole::Candidate));
    }
}
