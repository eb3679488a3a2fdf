//! Log output for mock sessions.
//!
//! The crate only emits `tracing` events. Test binaries that want to see
//! them call [`init_logging`] once; repeated calls are harmless.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "FETCH_MOCK_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install a test-friendly fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        assert!(!init_logging());
    }
}
