//! HTTP surface for SiteBook.
//!
//! # Responsibility
//! - Expose the bill entry lifecycle, queries and registries as JSON routes.
//! - Run every core call on the blocking pool against one shared connection.
//!
//! # Invariants
//! - Handlers never touch SQL directly; all reads and writes go through
//!   `sitebook_core` services.
//! - Every failure body is `{ "error": "<short message>" }`.

pub mod config;
mod error;
mod extract;
mod handlers;
mod routes;

use rusqlite::Connection;
use sitebook_core::ServiceResult;
use std::sync::{Arc, Mutex};

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a connection already opened through `sitebook_core::db`.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` with exclusive access to the connection on the blocking pool.
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::internal("database connection mutex poisoned"))?;
            op(&conn).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::internal(format!("blocking task failed: {err}")))?
    }
}
