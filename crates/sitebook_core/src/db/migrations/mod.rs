//! Ordered schema steps, tracked through `PRAGMA user_version`.
//!
//! Pending steps run inside one transaction, so a failure leaves the file at
//! its previous version.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// `(version, sql)` pairs in strictly increasing version order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

/// Brings `conn` up to `latest_version()`.
///
/// Fails with `DbError::UnsupportedSchemaVersion` when the file was written
/// by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, sql) in STEPS.iter().skip_while(|&&(version, _)| version <= from) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    log::info!("event=db_migrate module=db status=ok from_version={from} to_version={to}");
    Ok(())
}

pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
