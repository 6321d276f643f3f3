use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitebook_core::{
    BillEntry, BillEntryChanges, BillEntryDraft, EntryId, LifecycleService, Material, MaterialId,
    Project, QueryService, RegistryService, SqliteEntryRepository, SqliteRegistryRepository,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Entry form body. Fields are optional here so a missing one is reported
/// by name instead of as a generic decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub project_name: Option<String>,
    pub date: Option<String>,
    pub material: Option<String>,
    pub description: Option<String>,
    pub bill_amount: Option<Value>,
    pub payment_to: Option<String>,
    pub payment_by: Option<String>,
    pub payment_method: Option<String>,
}

impl EntryPayload {
    fn into_draft(self) -> Result<BillEntryDraft, ApiError> {
        Ok(BillEntryDraft {
            project_name: required("projectName", self.project_name)?,
            date: required("date", self.date)?,
            material: required("material", self.material)?,
            description: required("description", self.description)?,
            bill_amount: parse_amount(self.bill_amount)?,
            payment_to: required("paymentTo", self.payment_to)?,
            payment_by: required("paymentBy", self.payment_by)?,
            payment_method: required("paymentMethod", self.payment_method)?,
        })
    }

    fn into_changes(self) -> Result<BillEntryChanges, ApiError> {
        Ok(BillEntryChanges {
            date: required("date", self.date)?,
            material: required("material", self.material)?,
            description: required("description", self.description)?,
            bill_amount: parse_amount(self.bill_amount)?,
            payment_to: required("paymentTo", self.payment_to)?,
            payment_by: required("paymentBy", self.payment_by)?,
            payment_method: required("paymentMethod", self.payment_method)?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("`{field}` is required")))
}

/// Accepts a JSON number or a numeric string, as HTML forms send both.
///
/// `"inf"` and `"NaN"` parse as `f64` but are not amounts.
fn parse_amount(value: Option<Value>) -> Result<f64, ApiError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ApiError::bad_request("`billAmount` is required")),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    parsed
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ApiError::bad_request("`billAmount` must be a number"))
}

/// Same leniency as `parse_amount`, for integer ids.
fn parse_id(field: &str, value: Option<Value>) -> Result<EntryId, ApiError> {
    let parsed = match value {
        None | Some(Value::Null) => {
            return Err(ApiError::bad_request(format!("`{field}` is required")))
        }
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse::<EntryId>().ok(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| ApiError::bad_request(format!("`{field}` must be an integer")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    pub project_name: Option<String>,
    pub material: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPayload {
    pub name: Option<String>,
    pub expected_budget: Option<f64>,
}

impl ProjectPayload {
    fn into_parts(self) -> Result<(String, f64), ApiError> {
        let name = required("name", self.name)?;
        let budget = self
            .expected_budget
            .ok_or_else(|| ApiError::bad_request("`expected_budget` is required"))?;
        Ok((name, budget))
    }
}

#[derive(Debug, Deserialize)]
pub struct MaterialPayload {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_id: Option<EntryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_id: Option<EntryId>,
}

impl Ack {
    fn message(message: &'static str) -> Self {
        Self {
            message,
            id: None,
            archived_id: None,
            restored_id: None,
        }
    }

    fn with_id(message: &'static str, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::message(message)
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": sitebook_core::core_version(),
    }))
}

pub async fn save_entry(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EntryPayload>,
) -> ApiResult<Ack> {
    let draft = payload.into_draft()?;
    let id = state
        .run(move |conn| {
            LifecycleService::new(SqliteEntryRepository::try_new(conn)?).create_entry(&draft)
        })
        .await?;
    Ok(Json(Ack::with_id("Entry saved successfully", id)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(filter): Query<EntryFilter>,
) -> ApiResult<Vec<BillEntry>> {
    let project_name = filter
        .project_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("`projectName` is required"))?;
    let entries = state
        .run(move |conn| {
            QueryService::new(SqliteEntryRepository::try_new(conn)?).list_entries_by_project(
                &project_name,
                filter.material.as_deref(),
                filter.date.as_deref(),
            )
        })
        .await?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    PathParam(id): PathParam<EntryId>,
) -> ApiResult<BillEntry> {
    let entry = state
        .run(move |conn| QueryService::new(SqliteEntryRepository::try_new(conn)?).get_entry(id))
        .await?;
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    PathParam(id): PathParam<EntryId>,
    JsonBody(payload): JsonBody<EntryPayload>,
) -> ApiResult<Ack> {
    let changes = payload.into_changes()?;
    state
        .run(move |conn| {
            LifecycleService::new(SqliteEntryRepository::try_new(conn)?).update_entry(id, &changes)
        })
        .await?;
    Ok(Json(Ack::message("Bill entry updated successfully")))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    PathParam(id): PathParam<EntryId>,
) -> ApiResult<Ack> {
    let archived_id = state
        .run(move |conn| {
            LifecycleService::new(SqliteEntryRepository::try_new(conn)?).soft_delete(id)
        })
        .await?;
    Ok(Json(Ack {
        archived_id: Some(archived_id),
        ..Ack::message("Bill entry deleted and moved to deleted entries")
    }))
}

pub async fn list_deleted_entries(
    State(state): State<AppState>,
    PathParam(project_name): PathParam<String>,
) -> ApiResult<Vec<BillEntry>> {
    let entries = state
        .run(move |conn| {
            QueryService::new(SqliteEntryRepository::try_new(conn)?)
                .list_archived_by_project(&project_name)
        })
        .await?;
    Ok(Json(entries))
}

pub async fn restore_entry(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RestoreRequest>,
) -> ApiResult<Ack> {
    let archived_id = parse_id("id", request.id)?;
    let restored_id = state
        .run(move |conn| {
            LifecycleService::new(SqliteEntryRepository::try_new(conn)?).restore(archived_id)
        })
        .await?;
    Ok(Json(Ack {
        restored_id: Some(restored_id),
        ..Ack::message("Entry restored successfully")
    }))
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = state
        .run(|conn| RegistryService::new(SqliteRegistryRepository::try_new(conn)?).list_projects())
        .await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProjectPayload>,
) -> ApiResult<Ack> {
    let (name, budget) = payload.into_parts()?;
    let id = state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?)
                .create_project(&name, budget)
        })
        .await?;
    Ok(Json(Ack::with_id("Project created successfully", id)))
}

pub async fn get_project(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Project> {
    let project = state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?).get_project(&name)
        })
        .await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
    JsonBody(payload): JsonBody<ProjectPayload>,
) -> ApiResult<Ack> {
    let (new_name, budget) = payload.into_parts()?;
    state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?)
                .update_project(&name, &new_name, budget)
        })
        .await?;
    Ok(Json(Ack::message("Project updated successfully")))
}

pub async fn delete_project(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Ack> {
    state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?).delete_project(&name)
        })
        .await?;
    Ok(Json(Ack::message("Project deleted successfully")))
}

pub async fn project_budget(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Value> {
    let budget = state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?).project_budget(&name)
        })
        .await?;
    Ok(Json(json!({ "expected_budget": budget })))
}

pub async fn list_materials(State(state): State<AppState>) -> ApiResult<Vec<Material>> {
    let materials = state
        .run(|conn| RegistryService::new(SqliteRegistryRepository::try_new(conn)?).list_materials())
        .await?;
    Ok(Json(materials))
}

pub async fn create_material(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<MaterialPayload>,
) -> ApiResult<Ack> {
    let name = required("name", payload.name)?;
    let id = state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?).create_material(&name)
        })
        .await?;
    Ok(Json(Ack::with_id("Material added successfully", id)))
}

pub async fn rename_material(
    State(state): State<AppState>,
    PathParam(id): PathParam<MaterialId>,
    JsonBody(payload): JsonBody<MaterialPayload>,
) -> ApiResult<Ack> {
    let name = required("name", payload.name)?;
    state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?)
                .rename_material(id, &name)
        })
        .await?;
    Ok(Json(Ack::message("Material updated successfully")))
}

pub async fn delete_material(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Ack> {
    state
        .run(move |conn| {
            RegistryService::new(SqliteRegistryRepository::try_new(conn)?).delete_material(&name)
        })
        .await?;
    Ok(Json(Ack::message("Material deleted successfully")))
}
