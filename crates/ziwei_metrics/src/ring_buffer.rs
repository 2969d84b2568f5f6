//! Fixed-size window over the most recent samples

use std::collections::VecDeque;
use std::time::Duration;

pub struct RingBuffer<T> {
    window: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `sample`, evicting the oldest one when full.
    pub fn push(&mut self, sample: T) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);
    }
}

impl RingBuffer<Duration> {
    pub fn average(&self) -> Duration {
        match u32::try_from(self.window.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.window.iter().sum::<Duration>() / n,
        }
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }
}
