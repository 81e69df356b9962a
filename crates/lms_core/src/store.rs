//! The shared store every service reads and writes through.
//!
//! # Responsibility
//! - Own the storage backend and the id generator.
//! - Hand out typed collection repositories and per-domain services.
//!
//! # Invariants
//! - `create` is the only path that assigns `id` and `createdAt`.
//! - Services never hold collection data between calls; each call re-reads.

use crate::model::id::IdGenerator;
use crate::model::Entity;
use crate::repo::{CollectionRepository, RepoResult};
use crate::service::assessment_service::AssessmentService;
use crate::service::course_service::CourseService;
use crate::service::dashboard_service::DashboardService;
use crate::service::engagement_service::EngagementService;
use crate::service::messaging_service::MessagingService;
use crate::service::schedule_service::ScheduleService;
use crate::service::theme_service::ThemeService;
use crate::service::user_service::UserService;
use crate::storage::{MemoryStorage, StorageBackend};

pub struct LmsStore<B: StorageBackend> {
    backend: B,
    ids: IdGenerator,
}

impl LmsStore<MemoryStorage> {
    /// Store that lives only as long as the value.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}

impl<B: StorageBackend> LmsStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_id_generator(backend, IdGenerator::new())
    }

    pub fn with_id_generator(backend: B, ids: IdGenerator) -> Self {
        Self { backend, ids }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn collection<E: Entity>(&self) -> CollectionRepository<'_, E, B> {
        CollectionRepository::new(&self.backend)
    }

    /// Stamps a fresh id and `createdAt`, then appends the record.
    pub fn create<E: Entity>(&self, mut entity: E) -> RepoResult<E> {
        let (id, created_at) = self.ids.next();
        entity.assign_identity(id, created_at);
        self.collection::<E>().insert(entity)
    }

    pub fn users(&self) -> UserService<'_, B> {
        UserService::new(self)
    }

    pub fn courses(&self) -> CourseService<'_, B> {
        CourseService::new(self)
    }

    pub fn messaging(&self) -> MessagingService<'_, B> {
        MessagingService::new(self)
    }

    pub fn engagement(&self) -> EngagementService<'_, B> {
        EngagementService::new(self)
    }

    pub fn assessments(&self) -> AssessmentService<'_, B> {
        AssessmentService::new(self)
    }

    pub fn schedule(&self) -> ScheduleService<'_, B> {
        ScheduleService::new(self)
    }

    pub fn theme(&self) -> ThemeService<'_, B> {
        ThemeService::new(self)
    }

    pub fn dashboards(&self) -> DashboardService<'_, B> {
        DashboardService::new(self)
    }
}
