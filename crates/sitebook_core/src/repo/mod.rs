//! Storage handles for the entry stores and the registries.
//!
//! # Invariants
//! - A repository can only be built over a connection migrated to this
//!   build's schema.
//! - Misses and name clashes come back as dedicated variants, never as raw
//!   SQLite errors.

use crate::db::DbError;
use crate::model::bill_entry::{EntryId, EntryStore, EntryValidationError};
use std::fmt::{Display, Formatter};

pub mod entry_repo;
pub mod registry_repo;
mod schema;

pub use schema::SchemaMismatch;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Draft rejected before any write.
    Validation(EntryValidationError),
    Db(DbError),
    EntryNotFound { store: EntryStore, id: EntryId },
    ProjectNotFound(String),
    /// Keyed by name, or by `id N` for renames.
    MaterialNotFound(String),
    DuplicateName { table: &'static str, name: String },
    /// A stored row no longer fits the read model.
    InvalidData(String),
    Schema(SchemaMismatch),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => err.fmt(f),
            Self::Db(err) => err.fmt(f),
            Self::EntryNotFound { store, id } => write!(f, "no {store} bill entry with id {id}"),
            Self::ProjectNotFound(name) => write!(f, "no project named `{name}`"),
            Self::MaterialNotFound(key) => write!(f, "no material matching `{key}`"),
            Self::DuplicateName { table, name } => write!(f, "`{name}` is already in {table}"),
            Self::InvalidData(detail) => write!(f, "unreadable row: {detail}"),
            Self::Schema(mismatch) => write!(f, "database not ready: {mismatch}"),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::from(value).into()
    }
}

impl From<SchemaMismatch> for RepoError {
    fn from(value: SchemaMismatch) -> Self {
        Self::Schema(value)
    }
}
