use crate::{AppError, AppResult};

use std::{fs, panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "session_recorder=info,session_recorder_core=info";

/// Installs the global subscriber, writing to a daily rolling file in
/// `log_dir` so stdout stays free for the status line.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
#[track_caller]
pub fn init_logging(log_dir: &Path) -> AppResult<WorkerGuard> {
    fs::create_dir_all(log_dir).map_err(|e| AppError::LoggingError {
        reason: format!("Failed to create log directory {:?}: {}", log_dir, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "session-recorder.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}
