//! Domain model for project bookkeeping.
//!
//! # Responsibility
//! - Define the bill entry record and its active/archived placement.
//! - Define project and material reference data.
//!
//! # Invariants
//! - A bill entry lives in exactly one `EntryStore` at a time.
//! - Entries are never hard-deleted; removal means moving to the archive.

pub mod bill_entry;
pub mod registry;
