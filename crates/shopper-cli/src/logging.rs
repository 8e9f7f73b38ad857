//! Tracing subscriber setup.
//!
//! Console output goes to stderr at the level chosen by `-q`/`-v`. Every
//! invocation of `run` also writes a log file under
//! `<log_dir>/<YYYY-MM-DD>/<browser>/<HH-MM-SS>.log`, filtered by `RUST_LOG`
//! (default `info`).

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Path of the log file for a run started at `now`
#[must_use]
pub fn log_file_path(log_dir: &Path, browser: &str, now: DateTime<Local>) -> PathBuf {
    log_dir
        .join(now.format("%Y-%m-%d").to_string())
        .join(browser)
        .join(format!("{}.log", now.format("%H-%M-%S")))
}

fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_directive()))
}

/// Console-only logging, used by commands that do not drive a browser.
pub fn init_console(config: &CliConfig) -> CliResult<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(config.color.should_color())
        .with_filter(config.verbosity.console_level());

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}

/// Console plus per-run log file. Returns the log file path.
pub fn init_with_file(config: &CliConfig, log_dir: &Path, browser: &str) -> CliResult<PathBuf> {
    let path = log_file_path(log_dir, browser, Local::now());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = Arc::new(File::create(&path)?);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(config.color.should_color())
        .with_filter(config.verbosity.console_level());

    let file_layer = match config.log_format {
        LogFormat::Text => fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(file)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console)
        .with(env_filter(config))
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))?;
    Ok(path)
}
