//! Logging infrastructure for photo-renamer.
//!
//! Uses the `tracing` crate with file-based output. Logs go to
//! `~/.cache/photo-renamer/photo-renamer.log`. Configure verbosity via the
//! `PHOTO_RENAMER_LOG` environment variable (default: `info`).
//!
//! # Example
//!
//! ```bash
//! # Normal operation (info level)
//! photo-renamer tag . img.jpg --add Apple
//!
//! # See every rename and manager revision
//! PHOTO_RENAMER_LOG=debug photo-renamer tags . --delete Apple
//!
//! # Follow the log file
//! tail -f ~/.cache/photo-renamer/photo-renamer.log
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::LOG_ENV;

const APP_NAME: &str = "photo-renamer";
const LOG_FILENAME: &str = "photo-renamer.log";

/// Initialize the logging system.
///
/// Creates the log directory if needed and sets up file-based logging.
/// When `PHOTO_RENAMER_LOG` is set, also logs to stderr for immediate feedback.
/// Returns a guard that must be held for the duration of the program.
pub fn init_logging() -> Result<WorkerGuard> {
    let cache_dir = directories::ProjectDirs::from("", "", APP_NAME)
        .context("Failed to determine cache directory")?
        .cache_dir()
        .to_path_buf();

    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;

    let log_file = cache_dir.join(LOG_FILENAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let log_env = std::env::var(LOG_ENV).ok();
    let verbose = log_env.is_some();
    let filter_str = log_env.unwrap_or_else(|| "info".to_string());

    // Always active; span close events carry durations
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::CLOSE);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::CLOSE)
    });

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(&filter_str))
        .with(file_layer)
        .with(stderr_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    Ok(guard)
}

/// Get the path to the log file.
pub fn log_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().join(LOG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_names_the_log() {
        if let Some(path) = log_file_path() {
            assert_eq!(path.file_name().unwrap(), LOG_FILENAME);
        }
    }
}
