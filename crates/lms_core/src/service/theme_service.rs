//! Branding settings stored as a single document.

use crate::model::theme::{ThemeSettings, THEME_KEY};
use crate::repo::{DocumentRepository, RepoResult};
use crate::storage::StorageBackend;
use crate::store::LmsStore;

pub struct ThemeService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> ThemeService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    fn repo(&self) -> DocumentRepository<'s, ThemeSettings, B> {
        DocumentRepository::new(self.store.backend(), THEME_KEY)
    }

    /// Stored theme, or defaults when none has been saved.
    pub fn get_theme(&self) -> RepoResult<ThemeSettings> {
        Ok(self.repo().load()?.unwrap_or_default())
    }

    pub fn update_theme(&self, mutate: impl FnOnce(&mut ThemeSettings)) -> RepoResult<ThemeSettings> {
        let mut theme = self.get_theme()?;
        mutate(&mut theme);
        self.repo().save(&theme)?;
        Ok(theme)
    }

    pub fn reset_theme(&self) -> RepoResult<ThemeSettings> {
        self.repo().remove()?;
        Ok(ThemeSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::theme::ThemeSettings;
    use crate::store::LmsStore;

    #[test]
    fn update_persists_and_reset_restores_defaults() {
        let store = LmsStore::in_memory();
        assert_eq!(store.theme().get_theme().unwrap(), ThemeSettings::default());

        store
            .theme()
            .update_theme(|theme| {
                theme.company_name = "Acme Academy".to_string();
                theme.dark_mode = true;
            })
            .unwrap();
        let stored = store.theme().get_theme().unwrap();
        assert_eq!(stored.company_name, "Acme Academy");
        assert!(stored.dark_mode);

        store.theme().reset_theme().unwrap();
        assert_eq!(store.theme().get_theme().unwrap(), ThemeSettings::default());
    }
}
