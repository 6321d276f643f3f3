//! Bill entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and move APIs over the `bill_entries` (active) and
//!   `deleted_entries` (archived) tables.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `insert_entry` calls `BillEntryDraft::validate()` before SQL mutation.
//! - `move_entry` copies and deletes inside one `BEGIN IMMEDIATE` transaction;
//!   an entry is never observable in both tables or in neither.
//! - Listing order is insertion order (`id ASC`).

use crate::model::bill_entry::{BillEntry, BillEntryChanges, BillEntryDraft, EntryId, EntryStore};
use crate::repo::schema::check_schema;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const ENTRY_COLUMNS: &[&str] = &[
    "id",
    "project_name",
    "material",
    "description",
    "bill_amount",
    "payment_to",
    "payment_by",
    "payment_method",
    "date",
];

const ENTRY_SELECT_COLUMNS: &str = "id,
    project_name,
    material,
    description,
    bill_amount,
    payment_to,
    payment_by,
    payment_method,
    date";

/// Filter options for listing entries of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListQuery {
    pub store: EntryStore,
    /// Exact match on `project_name`.
    pub project_name: String,
    /// Exact match on `material` when set.
    pub material: Option<String>,
    /// Exact match on `date` when set.
    pub date: Option<String>,
}

impl EntryListQuery {
    /// All entries of `project_name` in `store`, no extra filters.
    pub fn project(store: EntryStore, project_name: impl Into<String>) -> Self {
        Self {
            store,
            project_name: project_name.into(),
            material: None,
            date: None,
        }
    }
}

/// Storage handle for bill entries across both stores.
pub trait EntryRepository {
    /// Inserts a validated entry into the active store, returning its new id.
    fn insert_entry(&self, draft: &BillEntryDraft) -> RepoResult<EntryId>;
    /// Overwrites every mutable field of one active entry.
    fn update_entry(&self, id: EntryId, changes: &BillEntryChanges) -> RepoResult<()>;
    /// Loads one entry from the given store.
    fn get_entry(&self, store: EntryStore, id: EntryId) -> RepoResult<Option<BillEntry>>;
    /// Lists entries matching the query.
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<BillEntry>>;
    /// Atomically moves one entry out of `from` into the opposite store.
    ///
    /// Returns the id assigned in the destination store.
    fn move_entry(&self, from: EntryStore, id: EntryId) -> RepoResult<EntryId>;
}

/// SQLite-backed entry repository.
#[derive(Clone, Copy)]
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - Fails when the schema version or entry tables do not match this binary.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        check_schema(
            conn,
            &[
                (EntryStore::Active.table(), ENTRY_COLUMNS),
                (EntryStore::Archived.table(), ENTRY_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn insert_entry(&self, draft: &BillEntryDraft) -> RepoResult<EntryId> {
        draft.validate()?;
        insert_into(self.conn, EntryStore::Active, draft)
    }

    fn update_entry(&self, id: EntryId, changes: &BillEntryChanges) -> RepoResult<()> {
        changes.validate()?;
        let changed = self.conn.execute(
            "UPDATE bill_entries
             SET
                date = ?1,
                material = ?2,
                description = ?3,
                bill_amount = ?4,
                payment_to = ?5,
                payment_by = ?6,
                payment_method = ?7
             WHERE id = ?8;",
            params![
                changes.date.as_str(),
                changes.material.as_str(),
                changes.description.as_str(),
                changes.bill_amount,
                changes.payment_to.as_str(),
                changes.payment_by.as_str(),
                changes.payment_method.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::EntryNotFound {
                store: EntryStore::Active,
                id,
            });
        }

        Ok(())
    }

    fn get_entry(&self, store: EntryStore, id: EntryId) -> RepoResult<Option<BillEntry>> {
        load_entry(self.conn, store, id)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<BillEntry>> {
        let mut sql = format!(
            "SELECT {ENTRY_SELECT_COLUMNS} FROM {} WHERE project_name = ?",
            query.store.table()
        );
        let mut bind_values = vec![Value::Text(query.project_name.clone())];

        if let Some(material) = &query.material {
            sql.push_str(" AND material = ?");
            bind_values.push(Value::Text(material.clone()));
        }

        if let Some(date) = &query.date {
            sql.push_str(" AND date = ?");
            bind_values.push(Value::Text(date.clone()));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn move_entry(&self, from: EntryStore, id: EntryId) -> RepoResult<EntryId> {
        let to = from.opposite();
        // Dropping `tx` before `commit` rolls back every statement below.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let entry =
            load_entry(&tx, from, id)?.ok_or(RepoError::EntryNotFound { store: from, id })?;
        let new_id = insert_into(&tx, to, &entry.fields)?;

        let removed = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", from.table()),
            [id],
        )?;
        if removed != 1 {
            return Err(RepoError::EntryNotFound { store: from, id });
        }

        tx.commit()?;
        Ok(new_id)
    }
}

fn insert_into(
    conn: &Connection,
    store: EntryStore,
    draft: &BillEntryDraft,
) -> RepoResult<EntryId> {
    conn.execute(
        &format!(
            "INSERT INTO {} (
                project_name,
                material,
                description,
                bill_amount,
                payment_to,
                payment_by,
                payment_method,
                date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            store.table()
        ),
        params![
            draft.project_name.as_str(),
            draft.material.as_str(),
            draft.description.as_str(),
            draft.bill_amount,
            draft.payment_to.as_str(),
            draft.payment_by.as_str(),
            draft.payment_method.as_str(),
            draft.date.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn load_entry(
    conn: &Connection,
    store: EntryStore,
    id: EntryId,
) -> RepoResult<Option<BillEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_SELECT_COLUMNS} FROM {} WHERE id = ?1;",
        store.table()
    ))?;
    let entry = stmt
        .query_row([id], |row| Ok(parse_entry_row(row)))
        .optional()?;
    entry.transpose()
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<BillEntry> {
    let id: EntryId = row.get("id")?;
    let bill_amount: f64 = row.get("bill_amount")?;
    if !bill_amount.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "non-finite bill_amount `{bill_amount}` on entry {id}"
        )));
    }

    Ok(BillEntry {
        id,
        fields: BillEntryDraft {
            project_name: row.get("project_name")?,
            date: row.get("date")?,
            material: row.get("material")?,
            description: row.get("description")?,
            bill_amount,
            payment_to: row.get("payment_to")?,
            payment_by: row.get("payment_by")?,
            payment_method: row.get("payment_method")?,
        },
    })
}
