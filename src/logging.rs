//! Tracing subscriber setup

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "driver_dashboard=info";

/// Install the global subscriber writing to `log_path`.
///
/// The level filter comes from `RUST_LOG` when set. The returned guard
/// flushes buffered lines on drop and must be held for the process
/// lifetime.
pub fn init(log_path: &Path, json: bool) -> anyhow::Result<WorkerGuard> {
    let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log path: {:?}", log_path))?;
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()?;
    }

    Ok(guard)
}
