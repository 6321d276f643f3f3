//! Command-line and environment configuration for the HTTP server.

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8032;

/// Runtime settings. Every flag can also be supplied as a `SITEBOOK_*`
/// environment variable, including through a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "sitebook")]
#[command(version, about = "SiteBook bill entry bookkeeping server", long_about = None)]
pub struct ServerConfig {
    /// SQLite database file; created and migrated on first start.
    #[arg(long, env = "SITEBOOK_DB_PATH", default_value = "sitebook.sqlite3")]
    pub db_path: PathBuf,

    #[arg(long, env = "SITEBOOK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = "SITEBOOK_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[arg(long, env = "SITEBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files. Defaults to `./logs`.
    #[arg(long, env = "SITEBOOK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| sitebook_core::default_log_level().to_string())
    }

    /// Absolute log directory, resolved against the current directory.
    pub fn resolved_log_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs"));
        if dir.is_absolute() {
            return Ok(dir);
        }
        Ok(std::env::current_dir()?.join(dir))
    }
}
