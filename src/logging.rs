//! Logging infrastructure for sifter
//!
//! Logs go to stderr and, unless disabled, to rotating files in the app data
//! directory. Stdout is reserved for command output and the `serve` protocol.
//!
//! ## Features
//!
//! - **File Rotation**: Daily rotation with 10 files retained
//! - **Error Tracking**: Separate `error.<date>.log` for warnings and errors
//! - **Filter Override**: `RUST_LOG` takes precedence over the configured level
//!
//! ## Usage
//!
//! ```no_run
//! use sifter::config::LoggingSettings;
//! use sifter::logging;
//!
//! logging::init(&LoggingSettings::default()).expect("Failed to initialize logging");
//! tracing::info!("Engine started");
//! ```

use crate::config::LoggingSettings;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/sifter/logs`
/// - macOS: `~/Library/Application Support/sifter/logs`
/// - Linux: `~/.local/share/sifter/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join("sifter").join("logs"))
}

fn resolve_log_dir(settings: &LoggingSettings) -> Result<PathBuf> {
    let log_dir = match &settings.directory {
        Some(dir) => dir.clone(),
        None => get_log_dir()?,
    };

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Initializes the logging system.
///
/// Creates two log files when file logging is enabled:
/// - `sifter.<date>.log`: everything passing the filter
/// - `error.<date>.log`: only warnings and errors
///
/// # Errors
///
/// Returns error if the log directory cannot be created, a file appender
/// fails, or a global subscriber is already installed.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Failed to create env filter")?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .pretty();

    if !settings.file_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(());
    }

    let log_dir = resolve_log_dir(settings)?;

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("sifter")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create error-logs file appender")?;

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized, log directory: {}", log_dir.display());

    Ok(())
}

/// Gets the path to the current log file
pub fn get_current_log_path(settings: &LoggingSettings) -> Result<PathBuf> {
    let log_dir = resolve_log_dir(settings)?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Ok(log_dir.join(format!("sifter.{today}.log")))
}
