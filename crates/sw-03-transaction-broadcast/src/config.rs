//! # Transaction Broadcast Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transaction broadcast configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Connected peers required before anything is sent.
    pub min_connected_peers: usize,

    /// Completed send rounds after which a transaction is given up on.
    pub max_retries: u32,

    /// A transaction is re-sent once its last attempt is older than this
    /// (milliseconds).
    pub retry_period_ms: u64,

    /// A peer send still running after this long counts as completed
    /// (milliseconds).
    pub send_timeout_ms: u64,

    /// Resend timer tick (milliseconds).
    pub timer_interval_ms: u64,

    /// Command channel capacity of the send worker.
    pub channel_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            min_connected_peers: 2,
            max_retries: 3,
            retry_period_ms: 60_000,
            send_timeout_ms: 30_000,
            timer_interval_ms: 10_000,
            channel_capacity: 256,
        }
    }
}

impl BroadcastConfig {
    /// Create a config for testing (short timers).
    pub fn for_testing() -> Self {
        Self {
            retry_period_ms: 50,
            send_timeout_ms: 50,
            timer_interval_ms: 10,
            channel_capacity: 16,
            ..Self::default()
        }
    }

    /// Peer send timeout.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Resend timer interval.
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BroadcastConfig::default();
        assert_eq!(config.min_connected_peers, 2);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.send_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BroadcastConfig = serde_json::from_str(r#"{"max_retries": 5}"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_period_ms, 60_000);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = BroadcastConfig {
            timer_interval_ms: 0,
            ..BroadcastConfig::for_testing()
        };
        assert_eq!(config.timer_interval(), Duration::from_millis(1));
    }
}
