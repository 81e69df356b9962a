//! Use-case services behind the dashboard pages.
//!
//! # Responsibility
//! - Implement page-level create/list/update operations on top of repositories.
//! - Keep callers (CLI, tests, future UI bindings) unaware of storage keys.
//!
//! # Invariants
//! - Services are stateless borrows of `LmsStore`; they hold no cached data.
//! - Cross-entity links are written but never enforced.

pub mod assessment_service;
pub mod course_service;
pub mod dashboard_service;
pub mod engagement_service;
pub mod messaging_service;
pub mod schedule_service;
pub mod theme_service;
pub mod user_service;
