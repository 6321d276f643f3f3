//! Bill entry domain model.
//!
//! # Responsibility
//! - Define the record shared by the active and archive stores.
//! - Validate creation input before it reaches persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused within one table.
//! - `bill_amount` is finite and strictly positive at creation time.
//! - Archived and restored copies keep every field except `id`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key of a bill entry.
pub type EntryId = i64;

/// Which of the two entry tables a row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStore {
    /// `bill_entries`: entries counted against a project.
    Active,
    /// `deleted_entries`: soft-deleted entries kept for restore.
    Archived,
}

impl EntryStore {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Active => "bill_entries",
            Self::Archived => "deleted_entries",
        }
    }

    /// The store an entry moves into when it leaves this one.
    pub fn opposite(self) -> Self {
        match self {
            Self::Active => Self::Archived,
            Self::Archived => Self::Active,
        }
    }
}

impl Display for EntryStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// Field payload of a bill entry, without identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillEntryDraft {
    /// Denormalized reference to `projects.name`.
    pub project_name: String,
    /// Opaque calendar date token, compared by exact match.
    pub date: String,
    pub material: String,
    pub description: String,
    pub bill_amount: f64,
    pub payment_to: String,
    pub payment_by: String,
    pub payment_method: String,
}

impl BillEntryDraft {
    /// Checks creation rules.
    ///
    /// Fields are checked in declaration order and the first failure wins.
    ///
    /// # Errors
    /// - `MissingField` when a text field is empty or whitespace-only.
    /// - `InvalidBillAmount` when the amount is NaN, infinite, zero or negative.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        for (field, value) in [
            ("projectName", &self.project_name),
            ("date", &self.date),
            ("material", &self.material),
            ("description", &self.description),
        ] {
            require_text(field, value)?;
        }

        if !self.bill_amount.is_finite() || self.bill_amount <= 0.0 {
            return Err(EntryValidationError::InvalidBillAmount(self.bill_amount));
        }

        for (field, value) in [
            ("paymentTo", &self.payment_to),
            ("paymentBy", &self.payment_by),
            ("paymentMethod", &self.payment_method),
        ] {
            require_text(field, value)?;
        }

        Ok(())
    }
}

/// Replacement values for an update; every field is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillEntryChanges {
    pub date: String,
    pub material: String,
    pub description: String,
    pub bill_amount: f64,
    pub payment_to: String,
    pub payment_by: String,
    pub payment_method: String,
}

impl BillEntryChanges {
    /// Checks update rules.
    ///
    /// Positivity is not re-checked here, only that the amount can be
    /// stored and read back.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if !self.bill_amount.is_finite() {
            return Err(EntryValidationError::NonFiniteBillAmount(self.bill_amount));
        }
        Ok(())
    }
}

/// Persisted bill entry as read back from either store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub fields: BillEntryDraft,
}

/// Input rule violations for bill entries.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValidationError {
    /// Required text field is missing or blank.
    MissingField(&'static str),
    /// Amount is not a finite positive number.
    InvalidBillAmount(f64),
    /// Amount is NaN or infinite.
    NonFiniteBillAmount(f64),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::InvalidBillAmount(amount) => {
                write!(f, "`billAmount` must be a positive number, got {amount}")
            }
            Self::NonFiniteBillAmount(amount) => {
                write!(f, "`billAmount` must be a finite number, got {amount}")
            }
        }
    }
}

impl Error for EntryValidationError {}

fn require_text(field: &'static str, value: &str) -> Result<(), EntryValidationError> {
    if value.trim().is_empty() {
        return Err(EntryValidationError::MissingField(field));
    }
    Ok(())
}
