use crate::handlers;
use crate::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(entry_routes())
        .merge(registry_routes())
        .with_state(state)
}

fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/save-entry", post(handlers::save_entry))
        .route("/bill_entries/projectName", get(handlers::list_entries))
        .route(
            "/bill_entries/:id",
            get(handlers::get_entry).put(handlers::update_entry),
        )
        .route("/delete_bill_entries/:id", delete(handlers::delete_entry))
        .route(
            "/deleted_entries/:project_name",
            get(handlers::list_deleted_entries),
        )
        .route("/restore_entry", post(handlers::restore_entry))
}

fn registry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/:name",
            get(handlers::get_project).put(handlers::update_project),
        )
        .route(
            "/projects/:name/expected_budget",
            get(handlers::project_budget),
        )
        .route("/projects/name/:name", delete(handlers::delete_project))
        .route(
            "/materials",
            get(handlers::list_materials).post(handlers::create_material),
        )
        // PUT addresses a material by id, DELETE by name.
        .route(
            "/materials/:material",
            put(handlers::rename_material).delete(handlers::delete_material),
        )
}
