//! User directory use-cases.

use crate::model::engagement::ActivityKind;
use crate::model::now_epoch_ms;
use crate::model::user::{NewUser, User, UserRole};
use crate::repo::filter::{eq_ignore_case, matches_text};
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use log::info;

pub struct UserService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> UserService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let user = self.store.create(new_user.into_user())?;
        info!(
            "event=user_create module=service status=ok user_id={} role={}",
            user.id, user.role
        );
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        self.store.collection::<User>().get(id)
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.store.collection::<User>().load_all()
    }

    pub fn users_by_role(&self, role: UserRole) -> RepoResult<Vec<User>> {
        self.store.collection::<User>().filter(|user| user.role == role)
    }

    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.store
            .collection::<User>()
            .find(|user| eq_ignore_case(&user.email, email))
    }

    /// Matches name, email, department, and position.
    pub fn search_users(&self, text: &str) -> RepoResult<Vec<User>> {
        self.store.collection::<User>().filter(|user| {
            matches_text(
                text,
                [
                    user.name.as_str(),
                    user.email.as_str(),
                    user.department.as_deref().unwrap_or_default(),
                    user.position.as_deref().unwrap_or_default(),
                ],
            )
        })
    }

    pub fn update_user(&self, id: &str, mutate: impl FnOnce(&mut User)) -> RepoResult<Option<User>> {
        self.store.collection::<User>().update(id, mutate)
    }

    pub fn delete_user(&self, id: &str) -> RepoResult<bool> {
        let removed = self.store.collection::<User>().delete(id)?;
        if removed {
            info!("event=user_delete module=service status=ok user_id={id}");
        }
        Ok(removed)
    }

    /// Stamps `lastLoginAt` and records a login activity.
    pub fn record_login(&self, id: &str) -> RepoResult<Option<User>> {
        let now = now_epoch_ms();
        let Some(user) = self.update_user(id, |user| user.last_login_at = Some(now))? else {
            return Ok(None);
        };
        self.store
            .engagement()
            .log_activity(&user.id, ActivityKind::Login, "Signed in")?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{NewUser, UserRole};
    use crate::store::LmsStore;

    #[test]
    fn search_covers_department_and_position() {
        let store = LmsStore::in_memory();
        let users = store.users();
        let mut ana = NewUser::new("Ana", "ana@acme.test", UserRole::Employee);
        ana.department = Some("Finance".to_string());
        users.create_user(ana).unwrap();
        let mut ben = NewUser::new("Ben", "ben@acme.test", UserRole::Employee);
        ben.position = Some("Finance analyst".to_string());
        users.create_user(ben).unwrap();
        users
            .create_user(NewUser::new("Cy", "cy@acme.test", UserRole::Hr))
            .unwrap();

        let hits = users.search_users("finance").unwrap();
        let names = hits.iter().map(|user| user.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Ana", "Ben"]);
    }

    #[test]
    fn find_by_email_ignores_case_and_whitespace() {
        let store = LmsStore::in_memory();
        let created = store
            .users()
            .create_user(NewUser::new("Ana", "Ana@Acme.test", UserRole::Candidate))
            .unwrap();
        let found = store.users().find_by_email(" ana@acme.TEST ").unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[test]
    fn record_login_sets_timestamp_and_logs_activity() {
        let store = LmsStore::in_memory();
        let user = store
            .users()
            .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Employee))
            .unwrap();

        let logged_in = store.users().record_login(&user.id).unwrap().unwrap();
        assert!(logged_in.last_login_at.is_some());
        assert_eq!(store.engagement().recent_activities(&user.id, 5).unwrap().len(), 1);
        assert!(store.users().record_login("missing").unwrap().is_none());
    }
}
