//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, writes and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a valid entry
    pub hits: u64,
    /// Lookups that found nothing usable (absent, stale, malformed or corrupt)
    pub misses: u64,
    /// Records written
    pub writes: u64,
    /// Entries removed by the byte-budget policy
    pub evictions: u64,
    /// Bytes of encoded records removed by the byte-budget policy
    pub evicted_bytes: u64,
    /// Corrupt entries deleted by scans or readers
    pub healed: u64,
    /// Current number of keys in the backend
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    // == Record Eviction ==
    /// Counts one evicted entry of `bytes` encoded size.
    pub fn record_eviction(&mut self, bytes: usize) {
        self.evictions += 1;
        self.evicted_bytes += bytes as u64;
    }

    pub fn record_healed(&mut self) {
        self.healed += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
