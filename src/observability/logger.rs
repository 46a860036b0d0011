//! Subscriber setup
//!
//! Human-readable lines on stdout, filtered by `RUST_LOG` when set and by
//! the run mode otherwise. Installed once per process.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::http_server::RunMode;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Development => "todo_api=debug,tower_http=debug",
        RunMode::Production => "todo_api=info,tower_http=info",
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(mode: RunMode) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(mode)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_by_mode() {
        assert!(default_filter(RunMode::Development).contains("debug"));
        assert!(default_filter(RunMode::Production).contains("info"));
    }
}
