//! Single-object documents (settings) stored under one key.

use super::collection_repo::{RepoError, RepoResult};
use crate::storage::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

pub struct DocumentRepository<'s, T, B: ?Sized> {
    backend: &'s B,
    key: &'static str,
    _document: PhantomData<fn() -> T>,
}

impl<'s, T, B> DocumentRepository<'s, T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend + ?Sized,
{
    pub fn new(backend: &'s B, key: &'static str) -> Self {
        Self {
            backend,
            key,
            _document: PhantomData,
        }
    }

    pub fn load(&self) -> RepoResult<Option<T>> {
        match self.backend.get_item(self.key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| RepoError::Serialization {
                    key: self.key,
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn save(&self, document: &T) -> RepoResult<()> {
        let raw = serde_json::to_string(document).map_err(|source| RepoError::Serialization {
            key: self.key,
            source,
        })?;
        self.backend.set_item(self.key, &raw)?;
        Ok(())
    }

    pub fn remove(&self) -> RepoResult<()> {
        self.backend.remove_item(self.key)?;
        Ok(())
    }
}
