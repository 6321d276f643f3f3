//! Project and material registry service.
//!
//! # Invariants
//! - Names are trimmed before persistence and must not be blank.
//! - Lookup keys are trimmed the same way, so a name addresses the row it
//!   created.
//! - Project budgets are finite and non-negative.

use crate::model::registry::{Material, MaterialId, Project, ProjectId};
use crate::repo::registry_repo::{MaterialRepository, ProjectRepository};
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Use-case service over the reference registries.
pub struct RegistryService<R> {
    repo: R,
}

impl<R: ProjectRepository + MaterialRepository> RegistryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_project(&self, name: &str, expected_budget: f64) -> ServiceResult<ProjectId> {
        let name = required_name(name)?;
        validate_budget(expected_budget)?;
        let id = self.repo.create_project(name, expected_budget)?;
        info!("event=project_create module=registry status=ok id={id}");
        Ok(id)
    }

    pub fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects()?)
    }

    pub fn get_project(&self, name: &str) -> ServiceResult<Project> {
        let name = name.trim();
        self.repo
            .get_project(name)?
            .ok_or_else(|| RepoError::ProjectNotFound(name.to_string()).into())
    }

    /// Returns the planned spend of one project.
    pub fn project_budget(&self, name: &str) -> ServiceResult<f64> {
        Ok(self.get_project(name)?.expected_budget)
    }

    /// Renames and re-budgets a project.
    ///
    /// Existing bill entries keep the old `project_name` string.
    pub fn update_project(
        &self,
        name: &str,
        new_name: &str,
        expected_budget: f64,
    ) -> ServiceResult<()> {
        let new_name = required_name(new_name)?;
        validate_budget(expected_budget)?;
        self.repo
            .update_project(name.trim(), new_name, expected_budget)?;
        info!("event=project_update module=registry status=ok");
        Ok(())
    }

    pub fn delete_project(&self, name: &str) -> ServiceResult<()> {
        self.repo.delete_project(name.trim())?;
        info!("event=project_delete module=registry status=ok");
        Ok(())
    }

    pub fn create_material(&self, name: &str) -> ServiceResult<MaterialId> {
        let id = self.repo.create_material(required_name(name)?)?;
        info!("event=material_create module=registry status=ok id={id}");
        Ok(id)
    }

    pub fn list_materials(&self) -> ServiceResult<Vec<Material>> {
        Ok(self.repo.list_materials()?)
    }

    pub fn rename_material(&self, id: MaterialId, name: &str) -> ServiceResult<()> {
        self.repo.rename_material(id, required_name(name)?)?;
        Ok(())
    }

    pub fn delete_material(&self, name: &str) -> ServiceResult<()> {
        self.repo.delete_material(name.trim())?;
        Ok(())
    }
}

fn required_name(name: &str) -> ServiceResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("`name` is required".to_string()));
    }
    Ok(trimmed)
}

fn validate_budget(expected_budget: f64) -> ServiceResult<()> {
    if !expected_budget.is_finite() || expected_budget < 0.0 {
        return Err(ServiceError::Validation(format!(
            "`expected_budget` must be a non-negative number, got {expected_budget}"
        )));
    }
    Ok(())
}
