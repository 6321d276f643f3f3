//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate every repository failure into the public `ServiceError`
//!   taxonomy so no raw storage error crosses this boundary.

use crate::model::bill_entry::EntryStore;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lifecycle_service;
pub mod query_service;
pub mod registry_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Public error kinds surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing or malformed input field.
    Validation(String),
    /// Target row does not exist in the store the operation reads.
    NotFound(String),
    /// Unique name already taken.
    Conflict(String),
    /// Underlying read/write failure. The detail is for logs only.
    Storage(String),
}

impl ServiceError {
    /// Short caller-facing message; storage detail is withheld.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::NotFound(message) | Self::Conflict(message) => {
                message
            }
            Self::Storage(_) => "internal storage error",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Storage(detail) => write!(f, "storage failure: {detail}"),
        }
    }
}

impl Error for ServiceError {}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::EntryNotFound {
                store: EntryStore::Active,
                ..
            } => Self::NotFound("Bill entry not found".to_string()),
            RepoError::EntryNotFound {
                store: EntryStore::Archived,
                ..
            } => Self::NotFound("Entry not found in deleted entries".to_string()),
            RepoError::ProjectNotFound(_) => Self::NotFound("Project not found".to_string()),
            RepoError::MaterialNotFound(_) => Self::NotFound("Material not found".to_string()),
            RepoError::DuplicateName { name, .. } => {
                Self::Conflict(format!("`{name}` already exists"))
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::db::DbError;
    use crate::model::bill_entry::{EntryStore, EntryValidationError};
    use crate::repo::RepoError;

    #[test]
    fn repo_errors_map_to_public_kinds() {
        let missing = ServiceError::from(RepoError::EntryNotFound {
            store: EntryStore::Archived,
            id: 4,
        });
        assert_eq!(
            missing,
            ServiceError::NotFound("Entry not found in deleted entries".to_string())
        );

        let invalid = ServiceError::from(RepoError::Validation(
            EntryValidationError::MissingField("date"),
        ));
        assert!(matches!(invalid, ServiceError::Validation(message) if message.contains("date")));

        let duplicate = ServiceError::from(RepoError::DuplicateName {
            table: "projects",
            name: "Tower A".to_string(),
        });
        assert!(matches!(duplicate, ServiceError::Conflict(_)));
    }

    #[test]
    fn storage_detail_is_not_public() {
        let err = ServiceError::from(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        }));
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(err.public_message(), "internal storage error");
        assert!(err.to_string().contains("schema version 9"));
    }
}
