use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{Error, Result};

/// Sends logs to a daily rolling file in `log_dir`; the terminal belongs to
/// the TUI. Keep the returned guard alive until exit so buffered lines are
/// flushed.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "world-explorer.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("world_explorer=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))?;

    Ok(guard)
}
