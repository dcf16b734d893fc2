//! Process-wide logging: append-mode file plus console echo.

use std::fs;
use std::io;
use std::path::Path;

use costline_engine::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the subscriber with a non-rotating append-mode file layer
/// and a console layer, both timestamped. `RUST_LOG` overrides the
/// configured level. The returned guard must stay alive for the whole run
/// so buffered lines flush on exit.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard, io::Error> {
    let dir = config
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let file_name = config
        .file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "pipeline.log".into());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(fmt::layer().with_writer(io::stdout))
        .init();

    Ok(guard)
}
