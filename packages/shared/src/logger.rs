//! Logging setup utilities for the relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crate targets that receive the default log level.
const LOG_TARGETS: &[&str] = &["cellrelay_server", "cellrelay_shared", "tower_http"];

/// Build the default `EnvFilter` directive used when `RUST_LOG` is not set.
///
/// Every relay crate and the binary itself log at `default_log_level`;
/// other crates fall back to the subscriber's default (`error`).
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    LOG_TARGETS
        .iter()
        .copied()
        .chain(std::iter::once(binary_target.as_str()))
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "cellrelay-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use cellrelay_shared::logger::setup_logger;
///
/// setup_logger("cellrelay-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
