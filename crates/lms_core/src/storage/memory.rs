//! In-process backend used by tests and throwaway sessions.

use super::{StorageBackend, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Map-backed storage. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }

    fn clear(&self) -> StorageResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::StorageBackend;

    #[test]
    fn set_get_remove_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("lms_users").unwrap(), None);

        storage.set_item("lms_users", "[]").unwrap();
        storage.set_item("lms_users", "[{}]").unwrap();
        assert_eq!(storage.get_item("lms_users").unwrap().as_deref(), Some("[{}]"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("lms_users").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn clear_drops_every_key() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);

        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
