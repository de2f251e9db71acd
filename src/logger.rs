//! Logging setup for the binary.
//!
//! Every target logs at the configured level to stderr. A valid `RUST_LOG`
//! adds per-target directives on top (`RUST_LOG=grades_rag::retrieval=trace`);
//! an invalid one is ignored rather than failing startup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: LevelFilter) -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_carries_configured_level() {
        // Only meaningful when the test runner has no RUST_LOG set.
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(filter(LevelFilter::DEBUG).max_level_hint(), Some(LevelFilter::DEBUG));
            assert_eq!(filter(LevelFilter::WARN).max_level_hint(), Some(LevelFilter::WARN));
        }
    }

    #[test]
    fn second_init_is_logger_error() {
        // The first call may already have happened in another test.
        let _ = init(LevelFilter::INFO);
        match init(LevelFilter::INFO) {
            Err(AppError::Logger(msg)) => assert!(msg.contains("subscriber")),
            other => panic!("expected logger error, got {other:?}"),
        }
    }
}
