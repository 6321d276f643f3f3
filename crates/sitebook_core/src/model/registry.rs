//! Project and material reference data.
//!
//! Both registries are keyed by a unique `name`. Bill entries refer to
//! projects by name only; nothing here cascades into the entry stores.

use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type MaterialId = i64;

/// A construction project with its planned spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub expected_budget: f64,
}

/// A material label offered to entry forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
}
