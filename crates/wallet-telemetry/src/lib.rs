//! # Wallet Telemetry
//!
//! Logging and metrics for the SPV wallet core.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an `EnvFilter` and a
//!   human or JSON formatter
//! - **Metrics**: Prometheus counters and histograms per subsystem
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wallet_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     // logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SW_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SW_JSON_LOGS` | `false` | JSON output |
//! | `SW_SERVICE_NAME` | `spv-wallet` | Service name in logs |
//! | `SW_NETWORK` | `testnet` | Network name |

#![warn(missing_docs)]

mod config;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, API_BROADCASTS, BATCH_DURATION,
    BROADCAST_PEERS, BROADCAST_RETRIES_EXHAUSTED, BROADCAST_ROUNDS, FILTER_REFRESH_SIGNALS,
    SELECTION_FAILURES, TRANSACTIONS_CREATED, TRANSACTIONS_INVALIDATED, TRANSACTIONS_PROCESSED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };
    init_logging(config)?;
    Ok(TelemetryGuard { metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Metrics handle, when metrics are enabled.
    pub fn metrics(&self) -> Option<&MetricsHandle> {
        self.metrics.as_ref()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use wallet_telemetry::subsystem_span;
///
/// fn apply_block() {
///     let _span = subsystem_span!("apply_block", subsystem = "sw-01", height = 800_000).entered();
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for adding to a counter.
#[macro_export]
macro_rules! metric_add {
    ($metric:expr, $value:expr) => {
        $metric.inc_by($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).inc_by($value)
    };
}
