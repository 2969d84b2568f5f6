//! Ziwei Metrics - bridge traffic counters and call latency tracking
//!
//! Zero-cost when the `metrics` feature is off: every type below has a no-op
//! stub with the same surface.
//!
//! # Usage
//!
//! ```ignore
//! use ziwei_metrics::{BridgeMetrics, names};
//!
//! let mut metrics = BridgeMetrics::new(32);
//! metrics.count(names::DISPATCHED);
//! metrics.record_latency(std::time::Duration::from_millis(3));
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod latency;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use latency::LatencyTracker;

use std::time::Duration;

/// Counter names used by the bridge.
pub mod names {
    pub const DISPATCHED: &str = "dispatched";
    pub const REJECTED_NOT_READY: &str = "rejected_not_ready";
    pub const REJECTED_BUSY: &str = "rejected_busy";
    pub const TRANSPORT_ERRORS: &str = "transport_errors";
    pub const DECODE_FAILURES: &str = "decode_failures";
    pub const CHARTS_DELIVERED: &str = "charts_delivered";
    pub const MESSAGES_RECEIVED: &str = "messages_received";
}

/// Counters plus a rolling window of evaluate latencies.
pub struct BridgeMetrics {
    counters: Counter,
    latency: LatencyTracker,
}

impl BridgeMetrics {
    pub fn new(window: usize) -> Self {
        Self {
            counters: Counter::new(),
            latency: LatencyTracker::new(window),
        }
    }

    pub fn count(&mut self, name: &str) {
        self.counters.increment(name, 1);
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters.get(name)
    }

    pub fn record_latency(&mut self, elapsed: Duration) {
        self.latency.record(elapsed);
    }

    pub fn average_latency_ms(&self) -> f64 {
        self.latency.average_ms()
    }

    pub fn max_latency_ms(&self) -> f64 {
        self.latency.max_ms()
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new(64)
    }
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
}

#[cfg(not(feature = "metrics"))]
pub struct LatencyTracker;

#[cfg(not(feature = "metrics"))]
impl LatencyTracker {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn record(&mut self, _elapsed: Duration) {}
    pub fn average_ms(&self) -> f64 { 0.0 }
    pub fn max_ms(&self) -> f64 { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_metrics_compile_in_both_modes() {
        let mut metrics = BridgeMetrics::default();
        metrics.count(names::DISPATCHED);
        metrics.record_latency(Duration::from_millis(4));
        let _ = metrics.average_latency_ms();

        #[cfg(feature = "metrics")]
        assert_eq!(metrics.get(names::DISPATCHED), 1);
        #[cfg(feature = "metrics")]
        assert!((metrics.max_latency_ms() - 4.0).abs() < 1e-9);
        #[cfg(not(feature = "metrics"))]
        assert_eq!(metrics.get(names::DISPATCHED), 0);
    }
}
