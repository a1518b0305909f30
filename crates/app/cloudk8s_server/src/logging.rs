//! Process-wide `tracing` subscriber.

use std::fs::OpenOptions;
use std::io;

use cloudk8s_core::config::{LogConfig, LogTarget};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `LOG_LEVEL` when set.
///
/// Lines are written by a background worker; keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init(config: &LogConfig) -> io::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));
    let (writer, guard) = writer(&config.target)?;

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(is_terminal(&config.target))
        .try_init()
        .map_err(io::Error::other)?;
    Ok(guard)
}

fn is_terminal(target: &LogTarget) -> bool {
    matches!(target, LogTarget::Stdout | LogTarget::Stderr)
}

fn writer(target: &LogTarget) -> io::Result<(NonBlocking, WorkerGuard)> {
    Ok(match target {
        LogTarget::Stdout => tracing_appender::non_blocking(io::stdout()),
        LogTarget::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogTarget::Discard => tracing_appender::non_blocking(io::sink()),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_appender::non_blocking(file)
        }
    })
}
