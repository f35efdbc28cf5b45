//! Log subscriber setup and output directory layout

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_PREFIX: &str = "curve-monitor.log";

/// Keeps the non-blocking file writer flushing; drop it only at exit.
pub struct LoggingGuard {
    pub _guard: WorkerGuard,
}

/// Console layer plus an hourly rolling file under `<output_dir>/logs`.
///
/// `json_file` switches the file layer to one JSON object per line so events
/// and poll failures can be shipped to a log pipeline. `RUST_LOG` overrides
/// the default `info` level.
pub fn setup_logging(output_dir: &Path, json_file: bool) -> Result<Arc<LoggingGuard>> {
    let file_appender = tracing_appender::rolling::hourly(output_dir.join("logs"), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;

    let console = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_level(true);

    let file = if json_file {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()?;

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}

/// Creates `logs/` and `events/` under the output directory and the state directory.
pub fn setup_output_directories(output_dir: &Path, state_dir: &Path) -> Result<()> {
    for dir in [output_dir.join("logs"), output_dir.join("events"), state_dir.to_path_buf()] {
        fs::create_dir_all(&dir)?;
    }
    Ok(())
}
