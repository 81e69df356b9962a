//! Typed access to entity collections over a raw key-value backend.
//!
//! # Responsibility
//! - Turn `StorageBackend` strings into typed records and back.
//! - Offer the full-scan lookups every dashboard page relies on.
//!
//! # Invariants
//! - Every write re-serializes and replaces the whole collection.
//! - Missing records surface as `None`/`false`, not as errors.
//! - Malformed persisted JSON is reported, never silently dropped.

pub mod collection_repo;
pub mod document_repo;
pub mod filter;

pub use collection_repo::{CollectionRepository, RepoError, RepoResult};
pub use document_repo::DocumentRepository;
