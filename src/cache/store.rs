//! Cache Store Module
//!
//! Public cache handle: layers TTL semantics, hit/miss accounting and a
//! single cache-wide lock over [`Backend`].

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{Backend, CacheEntry, CacheStats, EvictionPolicy};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Sweep cadence used when no TTL is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Everything guarded by the cache lock.
#[derive(Debug)]
pub(crate) struct CacheState<K, V> {
    pub(crate) backend: Backend<K, V>,
    pub(crate) stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Serialize + DeserializeOwned,
{
    pub(crate) fn put(&mut self, key: K, value: V) -> Result<()> {
        if self.backend.put(key, CacheEntry::new(value))?.is_some() {
            self.stats.record_eviction();
        }
        Ok(())
    }
}

// == Cache ==
/// Concurrency-safe cache with bounded capacity and optional TTL.
///
/// Cloning is cheap; all clones share the same storage and counters.
/// Lookups re-check freshness on every read, so a stale value is never
/// returned whether or not the background sweeper is running.
#[derive(Debug)]
pub struct Cache<K, V> {
    state: Arc<Mutex<CacheState<K, V>>>,
    ttl: Option<Duration>,
    sweep_interval: Duration,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            ttl: self.ttl,
            sweep_interval: self.sweep_interval,
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates an empty cache from `config`.
    ///
    /// Fails with [`CacheError::InvalidCapacity`] when capacity is zero.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or(CacheError::InvalidCapacity(config.capacity))?;
        let state = CacheState {
            backend: Backend::new(capacity, config.policy, config.compression),
            stats: CacheStats::new(),
        };
        Ok(Self::from_state(state, &config))
    }

    /// Creates a cache from capacity, policy and TTL alone.
    pub fn with_policy(capacity: usize, policy: EvictionPolicy, ttl: Option<Duration>) -> Result<Self> {
        Self::new(CacheConfig::new(capacity).with_policy(policy).with_ttl(ttl))
    }

    /// Wraps state built from `config`. A zero TTL or sweep interval is
    /// treated as unset.
    pub(crate) fn from_state(state: CacheState<K, V>, config: &CacheConfig) -> Self {
        let ttl = config.ttl.filter(|ttl| !ttl.is_zero());
        let sweep_interval = config
            .sweep_interval
            .filter(|interval| !interval.is_zero())
            .unwrap_or_else(|| default_sweep_interval(ttl));

        Self {
            state: Arc::new(Mutex::new(state)),
            ttl,
            sweep_interval,
        }
    }

    // == Get ==
    /// Retrieves a fresh value by key.
    ///
    /// An expired entry is removed and counted as a miss.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock().await;

        let Some(entry) = state.backend.get(key) else {
            state.stats.record_miss();
            return None;
        };

        if entry.is_expired(self.ttl) {
            state.backend.remove(key);
            state.stats.record_expirations(1);
            state.stats.record_miss();
            debug!("expired entry removed on read");
            return None;
        }

        state.stats.record_hit();
        Some(entry.value)
    }

    // == Put ==
    /// Stores a value, resetting its freshness clock.
    ///
    /// Fails only when compression is enabled and the value cannot be
    /// encoded.
    pub async fn put(&self, key: K, value: V) -> Result<()> {
        self.state.lock().await.put(key, value)
    }

    // == Remove ==
    /// Removes an entry; returns whether it was present.
    pub async fn remove(&self, key: &K) -> bool {
        self.state.lock().await.backend.remove(key)
    }

    /// Drops every entry. Counters are kept.
    pub async fn clear(&self) {
        self.state.lock().await.backend.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.backend.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.backend.is_empty()
    }

    // == Stats ==
    /// Returns a consistent snapshot of the counters and size.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            size: state.backend.len(),
            oldest_entry_timestamp: state.backend.oldest_timestamp(),
            ..state.stats.clone()
        }
    }

    // == Purge Expired ==
    /// Runs one expiration sweep, returning the number of entries removed.
    ///
    /// Nothing is awaited once the lock is held.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.backend.purge_expired(Utc::now(), self.ttl);
        state.stats.record_expirations(removed);
        removed
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub(crate) fn lock_state(&self) -> &Mutex<CacheState<K, V>> {
        &self.state
    }

    pub(crate) fn downgrade(&self) -> WeakCache<K, V> {
        WeakCache {
            state: Arc::downgrade(&self.state),
            ttl: self.ttl,
            sweep_interval: self.sweep_interval,
        }
    }
}

/// Non-owning handle; lets the sweeper stop once every [`Cache`] is dropped.
#[derive(Debug)]
pub(crate) struct WeakCache<K, V> {
    state: Weak<Mutex<CacheState<K, V>>>,
    ttl: Option<Duration>,
    sweep_interval: Duration,
}

impl<K, V> WeakCache<K, V> {
    pub(crate) fn upgrade(&self) -> Option<Cache<K, V>> {
        Some(Cache {
            state: self.state.upgrade()?,
            ttl: self.ttl,
            sweep_interval: self.sweep_interval,
        })
    }
}

/// Half the TTL, or [`DEFAULT_SWEEP_INTERVAL`] when that would be zero.
pub(crate) fn default_sweep_interval(ttl: Option<Duration>) -> Duration {
    ttl.map(|ttl| ttl / 2)
        .filter(|half| !half.is_zero())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL)
}
