// Logging setup using tracing.
// The terminal belongs to the UI, so log lines go to a file in the cache directory.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{BlogError, Result};
use crate::paths;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber writing to `path`.
///
/// Returns an error if the file cannot be opened or a subscriber is
/// already installed.
pub fn init(path: &Path, default_level: &str) -> Result<()> {
    let file = paths::open_log_file(path)?;

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| BlogError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}
