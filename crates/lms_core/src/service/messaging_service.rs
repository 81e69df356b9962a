//! Messages, announcements, notifications, and outbound email.
//!
//! # Invariants
//! - Inbox and announcement lists are newest first.
//! - Email dispatch records one `Email` per attempted recipient, in order.

use crate::mail::{send_batch, MailError, MailTransport};
use crate::model::communication::{Announcement, Email, EmailStatus, Message, Notification};
use crate::model::engagement::ActivityKind;
use crate::model::user::UserRole;
use crate::model::{Entity, EntityId};
use crate::repo::{RepoError, RepoResult};
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::{info, warn};
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Email content before it is split per recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_content: String,
    pub sender_id: String,
}

#[derive(Debug)]
pub enum EmailDispatchError {
    /// Delivery to `recipient` failed after `delivered` earlier sends succeeded.
    Mail {
        recipient: String,
        delivered: usize,
        source: MailError,
    },
    Repo(RepoError),
}

impl Display for EmailDispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mail {
                delivered, source, ..
            } => write!(f, "email dispatch stopped after {delivered} sent: {source}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EmailDispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mail { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for EmailDispatchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct MessagingService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> MessagingService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn send_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        subject: &str,
        body: &str,
    ) -> RepoResult<Message> {
        let message = self
            .store
            .create(Message::new(sender_id, recipient_id, subject, body))?;
        self.store.engagement().log_activity(
            sender_id,
            ActivityKind::MessageSent,
            format!("Sent message {}", message.id),
        )?;
        Ok(message)
    }

    pub fn inbox(&self, user_id: &str) -> RepoResult<Vec<Message>> {
        let mut messages = self
            .store
            .collection::<Message>()
            .filter(|message| message.recipient_id == user_id)?;
        newest_first(&mut messages, |message| message.created_at);
        Ok(messages)
    }

    pub fn sent_messages(&self, user_id: &str) -> RepoResult<Vec<Message>> {
        let mut messages = self
            .store
            .collection::<Message>()
            .filter(|message| message.sender_id == user_id)?;
        newest_first(&mut messages, |message| message.created_at);
        Ok(messages)
    }

    pub fn mark_message_read(&self, id: &str) -> RepoResult<Option<Message>> {
        self.store
            .collection::<Message>()
            .update(id, |message| message.read = true)
    }

    pub fn unread_count(&self, user_id: &str) -> RepoResult<usize> {
        Ok(self
            .store
            .collection::<Message>()
            .filter(|message| message.recipient_id == user_id && !message.read)?
            .len())
    }

    pub fn delete_message(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Message>().delete(id)
    }

    pub fn publish_announcement(&self, announcement: Announcement) -> RepoResult<Announcement> {
        let announcement = self.store.create(announcement)?;
        info!(
            "event=announcement_publish module=service status=ok announcement_id={} pinned={}",
            announcement.id, announcement.pinned
        );
        Ok(announcement)
    }

    /// Posts visible to `role`: pinned first, then newest first.
    pub fn announcements_for_role(&self, role: UserRole) -> RepoResult<Vec<Announcement>> {
        let mut posts = self
            .store
            .collection::<Announcement>()
            .filter(|post| post.is_visible_to(role))?;
        posts.sort_by_key(|post| (Reverse(post.pinned), Reverse(post.created_at), Reverse(id_key(post))));
        Ok(posts)
    }

    pub fn list_announcements(&self) -> RepoResult<Vec<Announcement>> {
        self.store.collection::<Announcement>().load_all()
    }

    pub fn delete_announcement(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Announcement>().delete(id)
    }

    pub fn notify(
        &self,
        user_id: &str,
        title: &str,
        body: impl Into<String>,
        link: Option<String>,
    ) -> RepoResult<Notification> {
        self.store.create(Notification {
            id: EntityId::new(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.into(),
            link,
            read: false,
            created_at: 0,
        })
    }

    pub fn notifications_for(&self, user_id: &str) -> RepoResult<Vec<Notification>> {
        let mut notifications = self
            .store
            .collection::<Notification>()
            .filter(|notification| notification.user_id == user_id)?;
        newest_first(&mut notifications, |notification| notification.created_at);
        Ok(notifications)
    }

    pub fn unread_notification_count(&self, user_id: &str) -> RepoResult<usize> {
        Ok(self
            .store
            .collection::<Notification>()
            .filter(|notification| notification.user_id == user_id && !notification.read)?
            .len())
    }

    /// Marks every notification of `user_id` read; returns how many changed.
    pub fn mark_all_notifications_read(&self, user_id: &str) -> RepoResult<usize> {
        let repo = self.store.collection::<Notification>();
        let mut notifications = repo.load_all()?;
        let mut changed = 0;
        for notification in notifications
            .iter_mut()
            .filter(|notification| notification.user_id == user_id && !notification.read)
        {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            repo.save_all(&notifications)?;
        }
        Ok(changed)
    }

    /// Sends `draft` to each recipient in order and records every attempt.
    ///
    /// Stops at the first delivery failure; that attempt is stored with
    /// status `failed` and later recipients are not tried.
    pub fn send_email<T: MailTransport + ?Sized>(
        &self,
        transport: &T,
        draft: &EmailDraft,
    ) -> Result<Vec<Email>, EmailDispatchError> {
        let outcome = send_batch(
            transport,
            &draft.recipients,
            &draft.subject,
            &draft.html_content,
            &draft.sender_id,
        );
        if let Some((recipient, source @ MailError::NoRecipients)) = outcome.failure {
            return Err(EmailDispatchError::Mail {
                recipient,
                delivered: 0,
                source,
            });
        }

        let mut recorded = Vec::with_capacity(outcome.delivered.len());
        for (to, receipt) in outcome.delivered {
            let mut email = email_record(draft, to, EmailStatus::Sent);
            email.tracking_id = Some(receipt.tracking_id);
            email.pixel_url = Some(receipt.pixel_url);
            recorded.push(self.store.create(email)?);
        }

        if let Some((recipient, source)) = outcome.failure {
            let mut email = email_record(draft, recipient.clone(), EmailStatus::Failed);
            email.error = Some(source.to_string());
            self.store.create(email)?;
            warn!(
                "event=email_dispatch module=service status=error delivered={} total={}",
                recorded.len(),
                draft.recipients.len()
            );
            return Err(EmailDispatchError::Mail {
                recipient,
                delivered: recorded.len(),
                source,
            });
        }

        info!(
            "event=email_dispatch module=service status=ok delivered={}",
            recorded.len()
        );
        Ok(recorded)
    }

    pub fn list_emails(&self) -> RepoResult<Vec<Email>> {
        let mut emails = self.store.collection::<Email>().load_all()?;
        newest_first(&mut emails, |email| email.created_at);
        Ok(emails)
    }

    /// Flags the email carrying `tracking_id` as opened (tracking pixel hit).
    pub fn mark_email_opened(&self, tracking_id: &str) -> RepoResult<Option<Email>> {
        let repo = self.store.collection::<Email>();
        let Some(email) = repo.find(|email| email.tracking_id.as_deref() == Some(tracking_id))?
        else {
            return Ok(None);
        };
        repo.update(email.id(), |email| email.opened = true)
    }
}

fn email_record(draft: &EmailDraft, to: String, status: EmailStatus) -> Email {
    Email {
        id: EntityId::new(),
        to,
        subject: draft.subject.clone(),
        html_content: draft.html_content.clone(),
        sender_id: draft.sender_id.clone(),
        status,
        tracking_id: None,
        pixel_url: None,
        error: None,
        opened: false,
        created_at: 0,
    }
}

/// Sorts by creation time descending; same-millisecond records fall back to
/// id order, which follows creation order within one store.
fn newest_first<T: Entity>(items: &mut [T], created_at: impl Fn(&T) -> i64) {
    items.sort_by(|left, right| {
        created_at(right)
            .cmp(&created_at(left))
            .then_with(|| id_key(right).cmp(&id_key(left)))
    });
}

fn id_key<T: Entity>(item: &T) -> i64 {
    item.id().parse().unwrap_or(0)
}
