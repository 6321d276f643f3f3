//! SiteBook HTTP server.
//!
//! Startup order: `.env`, arguments, logging, database migration, listener.
//! Logging comes up before the database so a failed open is recorded.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use sitebook_core::db::open_db;
use sitebook_server::{router, AppState, ServerConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    let log_dir = config
        .resolved_log_dir()
        .context("failed to resolve log directory")?;
    sitebook_core::init_logging(&config.log_level(), &log_dir.to_string_lossy())
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    let app = router(AppState::new(conn));

    let runtime = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    runtime.block_on(async {
        let addr = config.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        log::info!("event=server_start module=server status=ok addr={addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server terminated")?;

        log::info!("event=server_stop module=server status=ok");
        Ok::<(), anyhow::Error>(())
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("event=server_signal module=server status=error error={err}");
    }
}
