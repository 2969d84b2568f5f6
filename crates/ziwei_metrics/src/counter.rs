//! Named counters for bridge events

use std::collections::HashMap;

pub struct Counter {
    counters: HashMap<String, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }

    pub fn increment(&mut self, name: &str, value: usize) {
        *self.counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_name() {
        let mut counter = Counter::new();
        counter.increment("dispatched", 1);
        counter.increment("dispatched", 2);
        counter.increment("decode_failures", 1);

        assert_eq!(counter.get("dispatched"), 3);
        assert_eq!(counter.get("decode_failures"), 1);
        assert_eq!(counter.get("unknown"), 0);
    }
}
