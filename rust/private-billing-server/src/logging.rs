//! Installation of the tracing subscriber.

use tracing_subscriber::{filter::EnvFilter, FmtSubscriber};

use crate::settings::LoggingSettings;

/// Installs a global `fmt` subscriber with the configured filter.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init_logging(settings: LoggingSettings) {
    FmtSubscriber::builder()
        .with_env_filter(settings.filter)
        .with_ansi(true)
        .init();
}

/// Installs a global `fmt` subscriber with the filter of the `RUST_LOG` environment variable,
/// unless one is already installed.
///
/// Meant for tests, where several tests may try to install a subscriber.
pub fn try_init_logging_from_env() {
    let _ = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
