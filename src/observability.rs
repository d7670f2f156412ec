use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use crate::FatalError;
use crate::Result;

pub const LOG_FILE_NAME: &str = "harness.log";

/// Routes every harness log line to `<log_dir>/harness.log` through a
/// non-blocking writer, filtered by `RUST_LOG`.
///
/// Keep the returned guard alive for the whole run; dropping it flushes and
/// stops the writer. A subscriber installed earlier (by the test driver, for
/// instance) stays in place.
pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = std::fs::create_dir_all(log_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path))
        .map_err(|source| FatalError::Workspace {
            path: log_path.clone(),
            source,
        })?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    if let Err(e) = tracing_subscriber::registry().with(base_subscriber).try_init() {
        tracing::debug!("keeping existing subscriber: {}", e);
    }

    Ok(guard)
}
