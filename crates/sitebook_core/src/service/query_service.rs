//! Read-side service over the active and archived entry stores.
//!
//! # Invariants
//! - Results are in insertion order.
//! - Blank filter values behave as if the filter were absent.

use crate::model::bill_entry::{BillEntry, EntryId, EntryStore};
use crate::repo::entry_repo::{EntryListQuery, EntryRepository};
use crate::repo::RepoError;
use crate::service::ServiceResult;
use log::debug;

/// Query service for bill entries.
pub struct QueryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> QueryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists active entries of one project, optionally narrowed by exact
    /// material and date.
    pub fn list_entries_by_project(
        &self,
        project_name: &str,
        material: Option<&str>,
        date: Option<&str>,
    ) -> ServiceResult<Vec<BillEntry>> {
        let query = EntryListQuery {
            store: EntryStore::Active,
            project_name: project_name.to_string(),
            material: non_blank(material),
            date: non_blank(date),
        };
        let entries = self.repo.list_entries(&query)?;
        debug!(
            "event=entry_list module=query status=ok store=active count={}",
            entries.len()
        );
        Ok(entries)
    }

    /// Lists archived entries of one project.
    pub fn list_archived_by_project(&self, project_name: &str) -> ServiceResult<Vec<BillEntry>> {
        let entries = self
            .repo
            .list_entries(&EntryListQuery::project(EntryStore::Archived, project_name))?;
        debug!(
            "event=entry_list module=query status=ok store=archived count={}",
            entries.len()
        );
        Ok(entries)
    }

    /// Loads one active entry.
    pub fn get_entry(&self, id: EntryId) -> ServiceResult<BillEntry> {
        self.get_from(EntryStore::Active, id)
    }

    /// Loads one archived entry.
    pub fn get_archived_entry(&self, id: EntryId) -> ServiceResult<BillEntry> {
        self.get_from(EntryStore::Archived, id)
    }

    fn get_from(&self, store: EntryStore, id: EntryId) -> ServiceResult<BillEntry> {
        self.repo
            .get_entry(store, id)?
            .ok_or_else(|| RepoError::EntryNotFound { store, id }.into())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}
