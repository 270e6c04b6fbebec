// Tracing subscriber setup.
// The terminal belongs to the UI, so log lines go to a file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};
use crate::error::{HubError, Result};

const DEFAULT_FILTER: &str = "info";

/// Pick the filter directive: `RUST_LOG`, then the config file, then `info`.
pub fn resolve_filter(env: Option<String>, config: Option<&str>) -> String {
    env.filter(|s| !s.trim().is_empty())
        .or_else(|| config.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Parse a filter directive, falling back to the default on bad input.
pub fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber writing plain-text lines to `log_file`.
pub fn build_subscriber(
    log_file: File,
    env_filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}

/// Open (append) the log file, creating its directory.
fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. Returns the log file path.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = paths::log_path()
        .ok_or_else(|| HubError::Config("no data directory for logs".to_string()))?;
    let file = open_log(&path)?;

    let filter = resolve_filter(std::env::var("RUST_LOG").ok(), config.log_filter.as_deref());
    build_subscriber(file, env_filter(&filter))
        .try_init()
        .map_err(|e| HubError::Other(format!("logging already initialized: {}", e)))?;

    tracing::info!(log = %path.display(), filter = %filter, "logging started");
    Ok(path)
}
