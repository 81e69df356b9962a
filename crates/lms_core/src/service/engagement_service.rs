//! Badges, points, and the activity feed.
//!
//! # Invariants
//! - A badge id appears at most once in `User::badges`.
//! - Badge points are granted only on the first award.

use crate::model::engagement::{Activity, ActivityKind, Badge};
use crate::model::user::User;
use crate::model::EntityId;
use crate::repo::filter::push_unique;
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::info;

pub struct EngagementService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> EngagementService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn create_badge(&self, badge: Badge) -> RepoResult<Badge> {
        self.store.create(badge)
    }

    pub fn get_badge(&self, id: &str) -> RepoResult<Option<Badge>> {
        self.store.collection::<Badge>().get(id)
    }

    pub fn list_badges(&self) -> RepoResult<Vec<Badge>> {
        self.store.collection::<Badge>().load_all()
    }

    /// Deletes the badge record only; users keep the id in their lists.
    pub fn delete_badge(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Badge>().delete(id)
    }

    /// Grants `badge_id` to a user once.
    ///
    /// Returns `None` when the user does not exist. A second award is a no-op
    /// that returns the unchanged user.
    pub fn award_badge(&self, user_id: &str, badge_id: &str) -> RepoResult<Option<User>> {
        let badge = self.get_badge(badge_id)?;
        let mut newly_awarded = false;
        let updated = self.store.users().update_user(user_id, |user| {
            if push_unique(&mut user.badges, badge_id) {
                newly_awarded = true;
                user.points = user
                    .points
                    .saturating_add(badge.as_ref().map_or(0, |badge| badge.points));
            }
        })?;
        let Some(user) = updated else {
            return Ok(None);
        };

        if newly_awarded {
            let badge_name = badge.as_ref().map_or(badge_id, |badge| badge.name.as_str());
            info!(
                "event=badge_award module=service status=ok user_id={} badge_id={}",
                user.id, badge_id
            );
            self.log_activity(
                &user.id,
                ActivityKind::BadgeEarned,
                format!("Earned badge {badge_name}"),
            )?;
            self.store.messaging().notify(
                &user.id,
                "New badge",
                format!("You earned the {badge_name} badge."),
                None,
            )?;
        }
        Ok(Some(user))
    }

    /// Badge records for the ids a user holds; unknown ids are skipped.
    pub fn badges_for_user(&self, user_id: &str) -> RepoResult<Vec<Badge>> {
        let Some(user) = self.store.users().get_user(user_id)? else {
            return Ok(Vec::new());
        };
        self.store
            .collection::<Badge>()
            .filter(|badge| user.has_badge(&badge.id))
    }

    pub fn log_activity(
        &self,
        user_id: &str,
        kind: ActivityKind,
        description: impl Into<String>,
    ) -> RepoResult<Activity> {
        self.store.create(Activity {
            id: EntityId::new(),
            user_id: user_id.to_string(),
            kind,
            description: description.into(),
            created_at: 0,
        })
    }

    /// Newest first, at most `limit` entries.
    pub fn recent_activities(&self, user_id: &str, limit: usize) -> RepoResult<Vec<Activity>> {
        let mut activities = self
            .store
            .collection::<Activity>()
            .filter(|activity| activity.user_id == user_id)?;
        sort_newest_first(&mut activities);
        activities.truncate(limit);
        Ok(activities)
    }

    /// Users by points descending, ties broken by name.
    pub fn leaderboard(&self, limit: usize) -> RepoResult<Vec<User>> {
        let mut users = self.store.users().list_users()?;
        users.sort_by(|left, right| {
            right
                .points
                .cmp(&left.points)
                .then_with(|| left.name.cmp(&right.name))
        });
        users.truncate(limit);
        Ok(users)
    }
}

fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| id_number(&right.id).cmp(&id_number(&left.id)))
    });
}

fn id_number(id: &str) -> i64 {
    id.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use crate::model::engagement::Badge;
    use crate::model::user::{NewUser, UserRole};
    use crate::store::LmsStore;

    #[test]
    fn leaderboard_orders_by_points_then_name() {
        let store = LmsStore::in_memory();
        let users = store.users();
        for (name, points) in [("Cy", 10), ("Ana", 30), ("Ben", 10)] {
            let user = users
                .create_user(NewUser::new(name, format!("{name}@acme.test"), UserRole::Employee))
                .unwrap();
            users.update_user(&user.id, |user| user.points = points).unwrap();
        }

        let board = store.engagement().leaderboard(2).unwrap();
        let names = board.iter().map(|user| user.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Ana", "Ben"]);
    }

    #[test]
    fn award_to_missing_user_returns_none() {
        let store = LmsStore::in_memory();
        let badge = store
            .engagement()
            .create_badge(Badge::new("Starter", "star", 5))
            .unwrap();
        assert!(store.engagement().award_badge("nobody", &badge.id).unwrap().is_none());
    }

    #[test]
    fn award_of_unknown_badge_records_id_without_points() {
        let store = LmsStore::in_memory();
        let user = store
            .users()
            .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Employee))
            .unwrap();

        let awarded = store.engagement().award_badge(&user.id, "legacy").unwrap().unwrap();
        assert_eq!(awarded.badges, vec!["legacy"]);
        assert_eq!(awarded.points, 0);
        assert!(store.engagement().badges_for_user(&user.id).unwrap().is_empty());
    }

    #[test]
    fn award_caps_points_instead_of_overflowing() {
        let store = LmsStore::in_memory();
        let user = store
            .users()
            .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Employee))
            .unwrap();
        store
            .users()
            .update_user(&user.id, |user| user.points = u32::MAX - 5)
            .unwrap();
        let badge = store
            .engagement()
            .create_badge(Badge::new("Finisher", "trophy", 10))
            .unwrap();

        let awarded = store.engagement().award_badge(&user.id, &badge.id).unwrap().unwrap();
        assert_eq!(awarded.points, u32::MAX);
        assert_eq!(awarded.badges, vec![badge.id]);
    }
}
