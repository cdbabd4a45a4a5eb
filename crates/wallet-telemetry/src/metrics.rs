//! Prometheus metrics for the wallet subsystems.
//!
//! All metrics follow the naming convention: `sw_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // TRANSACTION PROCESSING METRICS (Subsystem 1)
    // =========================================================================

    /// Transactions applied to the ledger
    pub static ref TRANSACTIONS_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("sw_processing_transactions_total", "Transactions applied to the ledger"),
        &["lane", "outcome"]  // lane: block/pending/created, outcome: inserted/updated
    ).expect("metric creation failed");

    /// Transactions moved to the invalid set
    pub static ref TRANSACTIONS_INVALIDATED: Counter = Counter::new(
        "sw_processing_transactions_invalidated_total",
        "Transactions moved to the invalid set"
    ).expect("metric creation failed");

    /// Batches that asked for a bloom filter refresh
    pub static ref FILTER_REFRESH_SIGNALS: Counter = Counter::new(
        "sw_processing_filter_refresh_total",
        "Batches that required a bloom filter refresh"
    ).expect("metric creation failed");

    /// Batch duration
    pub static ref BATCH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "sw_processing_batch_duration_seconds",
            "Time spent applying a batch"
        ),
        &["lane"]
    ).expect("metric creation failed");

    // =========================================================================
    // COIN SELECTION METRICS (Subsystem 2)
    // =========================================================================

    /// Transactions created locally
    pub static ref TRANSACTIONS_CREATED: Counter = Counter::new(
        "sw_selection_transactions_created_total",
        "Transactions built, signed and stored"
    ).expect("metric creation failed");

    /// Failed selections by reason
    pub static ref SELECTION_FAILURES: CounterVec = CounterVec::new(
        Opts::new("sw_selection_failures_total", "Coin selection failures"),
        &["reason"]  // reason: not_enough/dust/empty/invalid
    ).expect("metric creation failed");

    // =========================================================================
    // BROADCAST METRICS (Subsystem 3)
    // =========================================================================

    /// Peer send rounds started
    pub static ref BROADCAST_ROUNDS: Counter = Counter::new(
        "sw_broadcast_rounds_total",
        "Peer send rounds started"
    ).expect("metric creation failed");

    /// Peers per send round
    pub static ref BROADCAST_PEERS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sw_broadcast_round_peers",
            "Peers selected per send round"
        ).buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0])
    ).expect("metric creation failed");

    /// Transactions given up on after the retry budget ran out
    pub static ref BROADCAST_RETRIES_EXHAUSTED: Counter = Counter::new(
        "sw_broadcast_retries_exhausted_total",
        "Transactions not relayed within the retry budget"
    ).expect("metric creation failed");

    /// Broadcast API answers
    pub static ref API_BROADCASTS: CounterVec = CounterVec::new(
        Opts::new("sw_broadcast_api_results_total", "Broadcast API answers"),
        &["result"]  // result: accepted/rejected
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics live in.
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// The registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Processing
        Box::new(TRANSACTIONS_PROCESSED.clone()),
        Box::new(TRANSACTIONS_INVALIDATED.clone()),
        Box::new(FILTER_REFRESH_SIGNALS.clone()),
        Box::new(BATCH_DURATION.clone()),
        // Selection
        Box::new(TRANSACTIONS_CREATED.clone()),
        Box::new(SELECTION_FAILURES.clone()),
        // Broadcast
        Box::new(BROADCAST_ROUNDS.clone()),
        Box::new(BROADCAST_PEERS.clone()),
        Box::new(BROADCAST_RETRIES_EXHAUSTED.clone()),
        Box::new(API_BROADCASTS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
    ($histogram:expr, $labels:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram.with_label_values($labels))
    };
}
