//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging and metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name in log output
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// JSON formatted logs instead of human-readable lines
    pub json_logs: bool,

    /// Register Prometheus metrics on startup
    pub metrics_enabled: bool,

    /// Network identifier (mainnet, testnet, regtest)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "spv-wallet".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
            network: "testnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SW_SERVICE_NAME`: Service name (default: spv-wallet)
    /// - `SW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SW_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SW_JSON_LOGS`: Enable JSON logs (default: false outside containers)
    /// - `SW_METRICS`: Register metrics (default: true)
    /// - `SW_NETWORK`: Network name (default: testnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("SW_SERVICE_NAME").unwrap_or_else(|_| "spv-wallet".to_string()),

            log_level: env::var("SW_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("SW_CONSOLE_OUTPUT")
                .map(|v| !is_off(&v))
                .unwrap_or(true),

            json_logs: env::var("SW_JSON_LOGS")
                .map(|v| is_on(&v))
                .unwrap_or(is_container),

            metrics_enabled: env::var("SW_METRICS").map(|v| !is_off(&v)).unwrap_or(true),

            network: env::var("SW_NETWORK").unwrap_or_else(|_| "testnet".to_string()),
        }
    }

    /// Service name qualified with the network.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.network)
    }
}

fn is_on(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn is_off(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}
