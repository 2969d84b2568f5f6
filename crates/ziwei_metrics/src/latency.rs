//! Evaluate-call latency tracking

use super::ring_buffer::RingBuffer;
use std::time::Duration;

pub struct LatencyTracker {
    samples: RingBuffer<Duration>,
}

impl LatencyTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RingBuffer::new(capacity),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    pub fn average_ms(&self) -> f64 {
        self.samples.average().as_secs_f64() * 1000.0
    }

    pub fn max_ms(&self) -> f64 {
        self.samples.max().as_secs_f64() * 1000.0
    }
}
