//! Core domain logic for SiteBook project bookkeeping.
//! This crate is the single source of truth for bill entry invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bill_entry::{
    BillEntry, BillEntryChanges, BillEntryDraft, EntryId, EntryStore, EntryValidationError,
};
pub use model::registry::{Material, MaterialId, Project, ProjectId};
pub use repo::entry_repo::{EntryListQuery, EntryRepository, SqliteEntryRepository};
pub use repo::registry_repo::{MaterialRepository, ProjectRepository, SqliteRegistryRepository};
pub use repo::{RepoError, RepoResult};
pub use service::lifecycle_service::LifecycleService;
pub use service::query_service::QueryService;
pub use service::registry_service::RegistryService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
