//! LFU Tracker Module
//!
//! Implements Least Frequently Used tracking for cache eviction.

use std::collections::HashMap;
use std::hash::Hash;

// == Usage ==
#[derive(Debug, Clone, Copy)]
struct Usage {
    /// Number of writes and successful reads
    count: u64,
    /// Monotonic sequence number assigned when the key was first inserted
    inserted: u64,
}

// == Frequency Tracker ==
/// Tracks usage counts for LFU eviction strategy.
///
/// The eviction candidate is the key with the smallest count. Ties are
/// broken by insertion order: among keys with equal counts the one inserted
/// first is evicted. Overwriting a key does not change its insertion
/// sequence; only removal followed by a fresh insert does.
#[derive(Debug)]
pub struct FrequencyTracker<K> {
    usage: HashMap<K, Usage>,
    next_seq: u64,
}

impl<K> Default for FrequencyTracker<K> {
    fn default() -> Self {
        Self {
            usage: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTracker<K> {
    // == Constructor ==
    /// Creates a new empty frequency tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Counts one use of `key`, registering it if it is new.
    pub fn record(&mut self, key: &K) {
        if let Some(usage) = self.usage.get_mut(key) {
            usage.count += 1;
            return;
        }
        let inserted = self.next_seq;
        self.next_seq += 1;
        self.usage.insert(key.clone(), Usage { count: 1, inserted });
    }

    // == Remove ==
    /// Forgets a key and its count.
    pub fn remove(&mut self, key: &K) {
        self.usage.remove(key);
    }

    // == Least Used ==
    /// Returns the eviction candidate without removing it.
    pub fn least_used(&self) -> Option<&K> {
        self.usage
            .iter()
            .min_by_key(|(_, usage)| (usage.count, usage.inserted))
            .map(|(key, _)| key)
    }

    /// Returns the current count for `key`.
    pub fn count(&self, key: &K) -> Option<u64> {
        self.usage.get(key).map(|usage| usage.count)
    }

    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }

    pub fn clear(&mut self) {
        self.usage.clear();
    }
}
