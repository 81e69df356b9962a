//! Meetings, webinars, classroom sessions, and batches.

use crate::model::engagement::ActivityKind;
use crate::model::schedule::{Batch, ClassroomSession, Meeting, MeetingKind, NewMeeting};
use crate::model::user::User;
use crate::repo::filter::push_unique;
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::info;

pub struct ScheduleService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> ScheduleService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn schedule_meeting(&self, new_meeting: NewMeeting) -> RepoResult<Meeting> {
        let meeting = self.store.create(new_meeting.into_meeting())?;
        self.store.engagement().log_activity(
            &meeting.host_id,
            ActivityKind::MeetingScheduled,
            format!("Scheduled {}", meeting.title),
        )?;
        Ok(meeting)
    }

    pub fn get_meeting(&self, id: &str) -> RepoResult<Option<Meeting>> {
        self.store.collection::<Meeting>().get(id)
    }

    /// Meetings the user hosts or attends.
    pub fn meetings_for_user(&self, user_id: &str) -> RepoResult<Vec<Meeting>> {
        self.store
            .collection::<Meeting>()
            .filter(|meeting| meeting.involves(user_id))
    }

    /// Meetings starting at or after `now`, soonest first.
    pub fn upcoming_meetings(&self, user_id: &str, now: i64) -> RepoResult<Vec<Meeting>> {
        let mut meetings = self
            .store
            .collection::<Meeting>()
            .filter(|meeting| meeting.involves(user_id) && meeting.start_at >= now)?;
        meetings.sort_by_key(|meeting| meeting.start_at);
        Ok(meetings)
    }

    pub fn webinars(&self) -> RepoResult<Vec<Meeting>> {
        let mut webinars = self
            .store
            .collection::<Meeting>()
            .filter(|meeting| meeting.kind == MeetingKind::Webinar)?;
        webinars.sort_by_key(|meeting| meeting.start_at);
        Ok(webinars)
    }

    pub fn register_for_webinar(&self, meeting_id: &str, user_id: &str) -> RepoResult<Option<Meeting>> {
        self.store
            .collection::<Meeting>()
            .update(meeting_id, |meeting| {
                push_unique(&mut meeting.participants, user_id);
            })
    }

    pub fn cancel_meeting(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Meeting>().delete(id)
    }

    pub fn create_session(&self, session: ClassroomSession) -> RepoResult<ClassroomSession> {
        self.store.create(session)
    }

    pub fn sessions_for_batch(&self, batch_id: &str) -> RepoResult<Vec<ClassroomSession>> {
        let mut sessions = self
            .store
            .collection::<ClassroomSession>()
            .filter(|session| session.batch_id.as_deref() == Some(batch_id))?;
        sessions.sort_by_key(|session| session.start_at);
        Ok(sessions)
    }

    pub fn mark_attendance(&self, session_id: &str, user_id: &str) -> RepoResult<Option<ClassroomSession>> {
        self.store
            .collection::<ClassroomSession>()
            .update(session_id, |session| {
                push_unique(&mut session.attendees, user_id);
            })
    }

    pub fn create_batch(&self, batch: Batch) -> RepoResult<Batch> {
        self.store.create(batch)
    }

    pub fn get_batch(&self, id: &str) -> RepoResult<Option<Batch>> {
        self.store.collection::<Batch>().get(id)
    }

    pub fn list_batches(&self) -> RepoResult<Vec<Batch>> {
        self.store.collection::<Batch>().load_all()
    }

    /// Adds members (deduplicated) and points each existing user at the batch.
    pub fn add_batch_members(&self, batch_id: &str, user_ids: &[String]) -> RepoResult<Option<Batch>> {
        let updated = self.store.collection::<Batch>().update(batch_id, |batch| {
            for user_id in user_ids {
                push_unique(&mut batch.members, user_id);
            }
        })?;
        let Some(batch) = updated else {
            return Ok(None);
        };

        let users = self.store.collection::<User>();
        let mut all_users = users.load_all()?;
        let mut touched = 0;
        for user in all_users
            .iter_mut()
            .filter(|user| user_ids.iter().any(|id| *id == user.id))
        {
            user.batch_id = Some(batch.id.clone());
            touched += 1;
        }
        if touched > 0 {
            users.save_all(&all_users)?;
        }
        info!(
            "event=batch_members_add module=service status=ok batch_id={} members={} users_updated={}",
            batch.id,
            batch.members.len(),
            touched
        );
        Ok(Some(batch))
    }

    /// Removes a member; clears the user's `batchId` when it points here.
    pub fn remove_batch_member(&self, batch_id: &str, user_id: &str) -> RepoResult<Option<Batch>> {
        let updated = self
            .store
            .collection::<Batch>()
            .update(batch_id, |batch| batch.members.retain(|id| id != user_id))?;
        if updated.is_some() {
            self.store.users().update_user(user_id, |user| {
                if user.batch_id.as_deref() == Some(batch_id) {
                    user.batch_id = None;
                }
            })?;
        }
        Ok(updated)
    }

    pub fn batch_for_user(&self, user_id: &str) -> RepoResult<Option<Batch>> {
        self.store
            .collection::<Batch>()
            .find(|batch| batch.has_member(user_id))
    }
}
