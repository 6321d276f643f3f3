//! Project and material registry persistence.
//!
//! # Invariants
//! - Names are unique per table; SQLite UNIQUE violations surface as
//!   `RepoError::DuplicateName`.
//! - Missing targets are detected by zero affected rows, not by a pre-read.
//! - Registry writes never touch the entry stores.

use crate::db::DbError;
use crate::model::registry::{Material, MaterialId, Project, ProjectId};
use crate::repo::schema::check_schema;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_COLUMNS: &[&str] = &["id", "name", "expected_budget"];
const MATERIAL_COLUMNS: &[&str] = &["id", "name"];

/// Repository interface for the project registry.
pub trait ProjectRepository {
    fn create_project(&self, name: &str, expected_budget: f64) -> RepoResult<ProjectId>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn get_project(&self, name: &str) -> RepoResult<Option<Project>>;
    /// Renames and re-budgets the project currently called `name`.
    fn update_project(&self, name: &str, new_name: &str, expected_budget: f64) -> RepoResult<()>;
    fn delete_project(&self, name: &str) -> RepoResult<()>;
}

/// Repository interface for the material registry.
pub trait MaterialRepository {
    fn create_material(&self, name: &str) -> RepoResult<MaterialId>;
    fn list_materials(&self) -> RepoResult<Vec<Material>>;
    fn rename_material(&self, id: MaterialId, name: &str) -> RepoResult<()>;
    fn delete_material(&self, name: &str) -> RepoResult<()>;
}

/// SQLite-backed project and material registry.
#[derive(Clone, Copy)]
pub struct SqliteRegistryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        check_schema(
            conn,
            &[
                ("projects", PROJECT_COLUMNS),
                ("materials", MATERIAL_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteRegistryRepository<'_> {
    fn create_project(&self, name: &str, expected_budget: f64) -> RepoResult<ProjectId> {
        self.conn
            .execute(
                "INSERT INTO projects (name, expected_budget) VALUES (?1, ?2);",
                params![name, expected_budget],
            )
            .map_err(|err| map_unique(err, "projects", name))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, expected_budget
             FROM projects
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn get_project(&self, name: &str) -> RepoResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, expected_budget
                 FROM projects
                 WHERE name = ?1;",
                [name],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?;
        project.transpose()
    }

    fn update_project(&self, name: &str, new_name: &str, expected_budget: f64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE projects
                 SET name = ?1,
                     expected_budget = ?2
                 WHERE name = ?3;",
                params![new_name, expected_budget, name],
            )
            .map_err(|err| map_unique(err, "projects", new_name))?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(name.to_string()));
        }
        Ok(())
    }

    fn delete_project(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE name = ?1;", [name])?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(name.to_string()));
        }
        Ok(())
    }
}

impl MaterialRepository for SqliteRegistryRepository<'_> {
    fn create_material(&self, name: &str) -> RepoResult<MaterialId> {
        self.conn
            .execute("INSERT INTO materials (name) VALUES (?1);", [name])
            .map_err(|err| map_unique(err, "materials", name))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_materials(&self) -> RepoResult<Vec<Material>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM materials ORDER BY id ASC;")?;
        let materials = stmt
            .query_map([], |row| {
                Ok(Material {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    fn rename_material(&self, id: MaterialId, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE materials SET name = ?1 WHERE id = ?2;",
                params![name, id],
            )
            .map_err(|err| map_unique(err, "materials", name))?;
        if changed == 0 {
            return Err(RepoError::MaterialNotFound(format!("id {id}")));
        }
        Ok(())
    }

    fn delete_material(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM materials WHERE name = ?1;", [name])?;
        if changed == 0 {
            return Err(RepoError::MaterialNotFound(name.to_string()));
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let name: String = row.get("name")?;
    let expected_budget: f64 = row.get("expected_budget")?;
    if !expected_budget.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "non-finite expected_budget `{expected_budget}` on project `{name}`"
        )));
    }
    Ok(Project {
        id: row.get("id")?,
        name,
        expected_budget,
    })
}

fn map_unique(err: rusqlite::Error, table: &'static str, name: &str) -> RepoError {
    let err = DbError::Sqlite(err);
    if err.is_unique_violation() {
        return RepoError::DuplicateName {
            table,
            name: name.to_string(),
        };
    }
    RepoError::Db(err)
}
