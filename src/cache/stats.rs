//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
///
/// The counters are cumulative for the cache's lifetime and never decrease.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a fresh value
    pub hits: u64,
    /// Lookups that found nothing or an expired value
    pub misses: u64,
    /// Entries removed to stay within capacity
    pub evictions: u64,
    /// Entries removed because they outlived the TTL
    pub expirations: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// Timestamp of the first entry in storage iteration order
    pub oldest_entry_timestamp: Option<DateTime<Utc>>,
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
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
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

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}
