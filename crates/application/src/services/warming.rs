//! Warming tracker - frequency counts for proactive pre-generation
//!
//! Counts how often each fingerprint is seen so a warming job can
//! pre-generate the popular ones. Process-local and bounded; losing the
//! counts on restart is acceptable.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded per-key sighting counter
#[derive(Debug)]
pub struct WarmingTracker {
    counts: Mutex<HashMap<String, u64>>,
    capacity: usize,
}

impl WarmingTracker {
    /// Create a tracker with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a tracker bounded to `capacity` distinct keys
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Record a sighting of `key`, returning its new count
    ///
    /// Keys beyond the capacity bound are dropped (returned count 0) rather
    /// than growing the map without limit.
    pub fn observe(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(key) {
            *count += 1;
            return *count;
        }
        if counts.len() >= self.capacity {
            debug!(key = %key, "Warming tracker full, dropping key");
            return 0;
        }
        counts.insert(key.to_string(), 1);
        1
    }

    /// Keys seen at least `min_hits` times, candidates for pre-generation
    #[must_use]
    pub fn candidates(&self, min_hits: u64) -> Vec<String> {
        self.counts
            .lock()
            .iter()
            .filter(|(_, count)| **count >= min_hits)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Forget all counts
    pub fn reset(&self) {
        self.counts.lock().clear();
    }

    /// Number of distinct keys tracked
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    /// True when nothing has been observed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }
}

impl Default for WarmingTracker {
    fn default() -> Self {
        Self::new()
    }
}
