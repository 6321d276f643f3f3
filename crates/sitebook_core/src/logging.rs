//! Process-wide logging bootstrap.
//!
//! # Invariants
//! - Logging is initialized at most once per process; repeating the same
//!   settings is a no-op and different ones are rejected.
//! - Initialization never panics.
//! - Panic payloads are flattened to one capped line before they are logged.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "sitebook";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SUMMARY_MAX_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogSettings {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        let level = level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| format!("unknown log level `{}`", level.trim()))?;

        let dir = dir.trim();
        if dir.is_empty() {
            return Err("log directory is empty".to_string());
        }
        if !Path::new(dir).is_absolute() {
            return Err(format!("log directory `{dir}` is not absolute"));
        }

        Ok(Self {
            level,
            dir: PathBuf::from(dir),
        })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts rolling file logs under the absolute `log_dir`.
///
/// Warnings and errors are also copied to stderr.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    if active.settings != requested {
        return Err(format!(
            "logging already running at level {} in `{}`",
            active.settings.level,
            active.settings.dir.display()
        ));
    }
    Ok(())
}

/// Active `(level, directory)`, if `init_logging` has succeeded.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir)
        .map_err(|err| format!("cannot create `{}`: {err}", settings.dir.display()))?;

    let spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger did not start: {err}"))?;

    install_panic_hook();
    log::info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        settings.level,
        settings.dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(
                || "unknown".to_string(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
        log::error!(
            "event=panic module=core status=error location={location} payload={}",
            panic_summary(info)
        );
        chained(info);
    }));
}

fn panic_summary(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    one_line(text, PANIC_SUMMARY_MAX_CHARS)
}

fn one_line(text: &str, max_chars: usize) -> String {
    let mut out = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(max_chars)
        .collect::<String>();
    if text.chars().nth(max_chars).is_some() {
        out.push_str("...");
    }
    out
}
