//! Connection bootstrap for the entry and registry stores.
//!
//! # Invariants
//! - Returned connections enforce foreign keys and wait up to 5s on a
//!   locked database.
//! - Returned connections are migrated to `migrations::latest_version()`.

use super::migrations::apply_migrations;
use super::DbResult;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a database file and migrates it.
///
/// File databases switch to WAL so readers on other connections are not
/// blocked by a move in progress. Writers still serialize on the file lock.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", || {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Ok(conn)
    })
}

/// Opens a private in-memory database and migrates it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", || Ok(Connection::open_in_memory()?))
}

fn open_logged(
    target: &'static str,
    connect: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started = Instant::now();
    log::debug!("event=db_open module=db status=start target={target}");

    let result = connect().and_then(|mut conn| {
        configure(&mut conn)?;
        Ok(conn)
    });
    let elapsed_ms = started.elapsed().as_millis();

    match &result {
        Ok(_) => log::info!(
            "event=db_open module=db status=ok target={target} duration_ms={elapsed_ms}"
        ),
        Err(err) => log::error!(
            "event=db_open module=db status=error target={target} duration_ms={elapsed_ms} error={err}"
        ),
    }
    result
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
