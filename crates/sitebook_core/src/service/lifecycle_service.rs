//! Bill entry lifecycle service.
//!
//! # Responsibility
//! - Create and update active entries.
//! - Soft-delete (active -> archived) and restore (archived -> active).
//!
//! # Invariants
//! - An entry exists in exactly one store after every call, successful or not.
//! - Moves assign a fresh id in the destination store; the old id is gone.
//! - Update does not re-check `bill_amount` positivity, only finiteness.

use crate::model::bill_entry::{BillEntryChanges, BillEntryDraft, EntryId, EntryStore};
use crate::repo::entry_repo::EntryRepository;
use crate::service::{ServiceError, ServiceResult};
use log::{error, info, warn};
use std::time::Instant;

/// Use-case service for the entry state machine.
pub struct LifecycleService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> LifecycleService<R> {
    /// Creates a service over the provided storage handle.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a new active entry and returns its id.
    ///
    /// # Errors
    /// - `Validation` when a field is blank or the amount is not positive.
    ///   Nothing is written.
    pub fn create_entry(&self, draft: &BillEntryDraft) -> ServiceResult<EntryId> {
        let started_at = Instant::now();
        if let Err(err) = draft.validate() {
            warn!(
                "event=entry_create module=lifecycle status=rejected reason={}",
                err
            );
            return Err(ServiceError::Validation(err.to_string()));
        }

        let result = self.repo.insert_entry(draft).map_err(ServiceError::from);
        log_outcome("entry_create", started_at, None, &result);
        result
    }

    /// Overwrites every mutable field of an active entry.
    ///
    /// # Errors
    /// - `Validation` when the amount is NaN or infinite. Nothing is written.
    pub fn update_entry(&self, id: EntryId, changes: &BillEntryChanges) -> ServiceResult<()> {
        let started_at = Instant::now();
        if let Err(err) = changes.validate() {
            warn!("event=entry_update module=lifecycle status=rejected id={id} reason={err}");
            return Err(ServiceError::Validation(err.to_string()));
        }
        let result = self
            .repo
            .update_entry(id, changes)
            .map_err(ServiceError::from);
        log_outcome("entry_update", started_at, Some(id), &result);
        result
    }

    /// Moves an active entry into the archive and returns its archive id.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not active, including when a concurrent call
    ///   archived it first. Neither store changes.
    /// - `Storage` when the move failed and was rolled back.
    pub fn soft_delete(&self, id: EntryId) -> ServiceResult<EntryId> {
        self.move_out_of(EntryStore::Active, id, "entry_soft_delete")
    }

    /// Moves an archived entry back into the active store and returns its new
    /// active id.
    pub fn restore(&self, archived_id: EntryId) -> ServiceResult<EntryId> {
        self.move_out_of(EntryStore::Archived, archived_id, "entry_restore")
    }

    fn move_out_of(
        &self,
        from: EntryStore,
        id: EntryId,
        event: &'static str,
    ) -> ServiceResult<EntryId> {
        let started_at = Instant::now();
        let result = self.repo.move_entry(from, id).map_err(ServiceError::from);
        if let Ok(new_id) = &result {
            info!(
                "event={event} module=lifecycle status=ok from={from} to={} id={id} new_id={new_id} duration_ms={}",
                from.opposite(),
                started_at.elapsed().as_millis()
            );
            return result;
        }
        log_outcome(event, started_at, Some(id), &result);
        result
    }
}

fn log_outcome<T: std::fmt::Debug>(
    event: &str,
    started_at: Instant,
    id: Option<EntryId>,
    result: &ServiceResult<T>,
) {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={event} module=lifecycle status=ok id={id} result={value:?} duration_ms={duration_ms}"
        ),
        Err(ServiceError::Storage(detail)) => error!(
            "event={event} module=lifecycle status=error id={id} duration_ms={duration_ms} error={detail}"
        ),
        Err(err) => warn!(
            "event={event} module=lifecycle status=rejected id={id} duration_ms={duration_ms} reason={err}"
        ),
    }
}
