//! Storage Module
//!
//! Bounded key/value container with a pluggable eviction policy. Storage
//! knows nothing about time or concurrency.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{FrequencyTracker, LruTracker};
use crate::error::CacheError;

// == Eviction Policy ==
/// Strategy used to pick a victim when storage is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently inserted or accessed key
    #[default]
    Lru,
    /// Evict the key with the fewest uses, oldest insertion first on ties
    Lfu,
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            _ => Err(CacheError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => f.write_str("lru"),
            Self::Lfu => f.write_str("lfu"),
        }
    }
}

// == Storage ==
/// Fixed-capacity container.
///
/// Invariant: `len() <= capacity()` after every `put`. Eviction happens
/// synchronously before a new key is inserted, so the key being written is
/// never its own victim.
///
/// Recency is a `VecDeque` scan, so `get`, `put` and `remove` are O(n) in
/// the number of stored keys under either policy.
#[derive(Debug)]
pub struct Storage<K, T> {
    entries: HashMap<K, T>,
    /// Access order; also the iteration order of the storage
    recency: LruTracker<K>,
    /// Present only under LFU
    frequency: Option<FrequencyTracker<K>>,
    capacity: NonZeroUsize,
    policy: EvictionPolicy,
}

impl<K, T> Storage<K, T>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    pub fn new(capacity: NonZeroUsize, policy: EvictionPolicy) -> Self {
        let frequency = match policy {
            EvictionPolicy::Lfu => Some(FrequencyTracker::new()),
            EvictionPolicy::Lru => None,
        };
        Self {
            entries: HashMap::new(),
            recency: LruTracker::new(),
            frequency,
            capacity,
            policy,
        }
    }

    // == Get ==
    /// Looks up a key, marking it as used.
    ///
    /// Moves the key to the most-recent position and, under LFU, bumps its
    /// usage count.
    pub fn get(&mut self, key: &K) -> Option<&T> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.recency.touch(key);
        if let Some(frequency) = self.frequency.as_mut() {
            frequency.record(key);
        }
        self.entries.get(key)
    }

    /// Looks up a key without affecting recency or usage counts.
    pub fn peek(&self, key: &K) -> Option<&T> {
        self.entries.get(key)
    }

    // == Put ==
    /// Inserts or overwrites a value.
    ///
    /// Returns the key that was evicted to make room, if any.
    pub fn put(&mut self, key: K, value: T) -> Option<K> {
        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity.get() {
            evicted = self.evict_one();
        }

        self.recency.touch(&key);
        if let Some(frequency) = self.frequency.as_mut() {
            frequency.record(&key);
        }
        self.entries.insert(key, value);
        evicted
    }

    // == Remove ==
    pub fn remove(&mut self, key: &K) -> Option<T> {
        let value = self.entries.remove(key)?;
        self.forget(key);
        Some(value)
    }

    // == Retain ==
    /// Keeps only the entries for which `keep` returns true.
    ///
    /// Returns the number of entries removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &T) -> bool,
    {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|&(key, value)| !keep(key, value))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.forget(key);
        }
        doomed.len()
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.recency
            .iter_oldest_first()
            .filter_map(move |key| self.entries.get(key).map(|value| (key, value)))
    }

    /// Returns the entry the iteration order yields first.
    pub fn first(&self) -> Option<(&K, &T)> {
        self.iter().next()
    }

    /// Usage count for `key`; always `None` under LRU.
    pub fn usage(&self, key: &K) -> Option<u64> {
        self.frequency.as_ref().and_then(|frequency| frequency.count(key))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        if let Some(frequency) = self.frequency.as_mut() {
            frequency.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    fn evict_one(&mut self) -> Option<K> {
        let victim = match self.frequency.as_mut() {
            Some(frequency) => {
                let victim = frequency.least_used().cloned()?;
                frequency.remove(&victim);
                self.recency.remove(&victim);
                victim
            }
            None => self.recency.evict_oldest()?,
        };
        self.entries.remove(&victim);
        debug!(policy = %self.policy, "evicted entry to stay within capacity");
        Some(victim)
    }

    fn forget(&mut self, key: &K) {
        self.recency.remove(key);
        if let Some(frequency) = self.frequency.as_mut() {
            frequency.remove(key);
        }
    }
}
