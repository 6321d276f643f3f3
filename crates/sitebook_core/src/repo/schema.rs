//! Guards repository construction against unmigrated or altered files.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Table name with the columns a repository reads and writes.
pub(crate) type TableShape = (&'static str, &'static [&'static str]);

/// How the connected database differs from what this build expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    Version { expected: u32, found: u32 },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for SchemaMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Version { expected, found } => {
                write!(f, "schema version {found}, expected {expected}")
            }
            Self::MissingTable(table) => write!(f, "table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "column `{table}.{column}` is missing")
            }
        }
    }
}

pub(crate) fn check_schema(conn: &Connection, tables: &[TableShape]) -> RepoResult<()> {
    let expected = latest_version();
    let found = current_user_version(conn)?;
    if found != expected {
        return Err(SchemaMismatch::Version { expected, found }.into());
    }

    for &(table, columns) in tables {
        let present = column_names(conn, table)?;
        if present.is_empty() {
            return Err(SchemaMismatch::MissingTable(table).into());
        }
        if let Some(&column) = columns.iter().find(|column| !present.contains(**column)) {
            return Err(SchemaMismatch::MissingColumn { table, column }.into());
        }
    }
    Ok(())
}

/// Column names of `table`; empty when the table does not exist.
fn column_names(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}
