//! Generic JSON-array collection repository.

use crate::model::Entity;
use crate::storage::{StorageBackend, StorageError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    /// Stored value under `key` could not be (de)serialized.
    Serialization {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization { key, source } => {
                write!(f, "invalid persisted data under `{key}`: {source}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Typed view over the collection stored under `E::KEY`.
pub struct CollectionRepository<'s, E, B: ?Sized> {
    backend: &'s B,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, E: Entity, B: StorageBackend + ?Sized> CollectionRepository<'s, E, B> {
    pub fn new(backend: &'s B) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// Reads the whole collection. An absent key is an empty collection.
    pub fn load_all(&self) -> RepoResult<Vec<E>> {
        match self.backend.get_item(E::KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| RepoError::Serialization {
                key: E::KEY,
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the whole collection.
    pub fn save_all(&self, items: &[E]) -> RepoResult<()> {
        let raw = serde_json::to_string(items).map_err(|source| RepoError::Serialization {
            key: E::KEY,
            source,
        })?;
        self.backend.set_item(E::KEY, &raw)?;
        debug!(
            "event=collection_write module=repo key={} count={}",
            E::KEY,
            items.len()
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<E>> {
        self.find(|item| item.id() == id)
    }

    /// Appends one record as-is; identity must already be assigned.
    pub fn insert(&self, entity: E) -> RepoResult<E> {
        let mut items = self.load_all()?;
        items.push(entity.clone());
        self.save_all(&items)?;
        Ok(entity)
    }

    /// Overwrites the first record sharing `entity`'s id.
    ///
    /// Returns `false` and writes nothing when no record matches.
    pub fn replace(&self, entity: &E) -> RepoResult<bool> {
        let mut items = self.load_all()?;
        match items.iter_mut().find(|item| item.id() == entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                self.save_all(&items)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Applies `mutate` to the record with `id` and persists the result.
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut E)) -> RepoResult<Option<E>> {
        let mut items = self.load_all()?;
        let Some(slot) = items.iter_mut().find(|item| item.id() == id) else {
            return Ok(None);
        };
        mutate(slot);
        let updated = slot.clone();
        self.save_all(&items)?;
        Ok(Some(updated))
    }

    /// Removes records with `id`; returns whether anything was removed.
    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        let items = self.load_all()?;
        let before = items.len();
        let kept = items
            .into_iter()
            .filter(|item| item.id() != id)
            .collect::<Vec<_>>();
        if kept.len() == before {
            return Ok(false);
        }
        self.save_all(&kept)?;
        Ok(true)
    }

    pub fn find(&self, predicate: impl Fn(&E) -> bool) -> RepoResult<Option<E>> {
        Ok(self.load_all()?.into_iter().find(|item| predicate(item)))
    }

    pub fn filter(&self, predicate: impl Fn(&E) -> bool) -> RepoResult<Vec<E>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|item| predicate(item))
            .collect())
    }

    pub fn count(&self) -> RepoResult<usize> {
        Ok(self.load_all()?.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.count()? == 0)
    }

    /// Drops the key entirely.
    pub fn clear(&self) -> RepoResult<()> {
        self.backend.remove_item(E::KEY)?;
        Ok(())
    }
}
