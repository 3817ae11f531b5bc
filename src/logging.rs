use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::ChatResult;

/// Log file name prefix inside the log directory
const LOG_FILE: &str = "chat.log";

/// Initialize the logging system
///
/// Logs are written to `dir` only (no console output) so they never
/// interleave with streamed chat text on the terminal.
pub fn init_logging(dir: impl AsRef<Path>) -> ChatResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    // Daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to INFO level, can be overridden with RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding apps); keep it.
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already set, skipping logging init");
        return Ok(());
    }

    tracing::info!("Logging system initialized");
    tracing::info!("Log files location: {}", dir.join(LOG_FILE).display());

    Ok(())
}

/// Check if the log directory exists
pub fn logs_dir_exists(dir: impl AsRef<Path>) -> bool {
    dir.as_ref().exists()
}
