//! Snapshot Module
//!
//! Exports cache contents to JSON and rebuilds a cache from such a snapshot.
//! Timestamps are not preserved: restored entries count as freshly written.

use std::hash::Hash;
use std::num::NonZeroUsize;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::store::CacheState;
use crate::cache::{Backend, Cache, CacheStats};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// On-disk snapshot layout: `{"entries": [[key, value], ...]}`, least
/// recently used first.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    // == Serialize ==
    /// Serializes all values (not timestamps) to JSON bytes.
    ///
    /// Counters are not included.
    pub async fn serialize(&self) -> Result<Vec<u8>> {
        let entries = self.lock_state().lock().await.backend.export();
        Ok(serde_json::to_vec(&Snapshot { entries })?)
    }

    // == Deserialize ==
    /// Rebuilds a cache from snapshot bytes with default settings and the
    /// given capacity.
    pub fn deserialize(bytes: &[u8], capacity: usize) -> Result<Self> {
        Self::deserialize_with(bytes, CacheConfig::new(capacity))
    }

    /// Rebuilds a cache from snapshot bytes using `config`.
    ///
    /// The snapshot is parsed completely before anything is built, so a
    /// malformed snapshot never yields a partial cache. Entries are replayed
    /// oldest first through the normal insert path: capacity is enforced and
    /// every entry is stamped with the current time.
    pub fn deserialize_with(bytes: &[u8], config: CacheConfig) -> Result<Self> {
        let snapshot: Snapshot<K, V> = serde_json::from_slice(bytes)
            .map_err(|err| CacheError::InvalidSnapshot(err.to_string()))?;
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or(CacheError::InvalidCapacity(config.capacity))?;

        let mut state = CacheState {
            backend: Backend::new(capacity, config.policy, config.compression),
            stats: CacheStats::new(),
        };
        let restored = snapshot.entries.len();
        for (key, value) in snapshot.entries {
            state.put(key, value)?;
        }
        // Evictions during restore are not caller-visible activity
        state.stats = CacheStats::new();

        info!(
            restored,
            size = state.backend.len(),
            "cache restored from snapshot"
        );

        Ok(Self::from_state(state, &config))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CompressionConfig, EvictionPolicy};
    use chrono::Utc;

    async fn populated() -> Cache<String, i64> {
        let cache = Cache::with_policy(8, EvictionPolicy::Lru, None).unwrap();
        for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
            cache.put(key.to_string(), value).await.unwrap();
        }
        cache
    }

    #[tokio::test]
    async fn test_serialize_format_drops_timestamps() {
        let cache = populated().await;
        let bytes = cache.serialize().await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json, serde_json::json!({"entries": [["a", 1], ["b", 2], ["c", 3]]}));
    }

    #[tokio::test]
    async fn test_serialize_does_not_count_hits() {
        let cache = populated().await;
        cache.serialize().await.unwrap();
        let stats = cache.stats().await;
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn test_restore_round_trip_with_fresh_timestamps() {
        let original = populated().await;
        let bytes = original.serialize().await.unwrap();

        let before = Utc::now();
        let restored: Cache<String, i64> = Cache::deserialize(&bytes, 8).unwrap();

        assert_eq!(restored.len().await, 3);
        assert_eq!(restored.get(&"b".to_string()).await, Some(2));
        let stats = restored.stats().await;
        assert!(stats.oldest_entry_timestamp.unwrap() >= before);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_restore_enforces_capacity_keeping_newest() {
        let bytes = populated().await.serialize().await.unwrap();
        let restored: Cache<String, i64> = Cache::deserialize(&bytes, 2).unwrap();

        assert_eq!(restored.len().await, 2);
        assert_eq!(restored.get(&"a".to_string()).await, None);
        assert_eq!(restored.get(&"c".to_string()).await, Some(3));
    }

    #[tokio::test]
    async fn test_restore_into_compressed_lfu_cache() {
        let bytes = populated().await.serialize().await.unwrap();
        let config = CacheConfig::new(4)
            .with_policy(EvictionPolicy::Lfu)
            .with_compression(CompressionConfig::default());
        let restored: Cache<String, i64> = Cache::deserialize_with(&bytes, config).unwrap();

        assert_eq!(restored.serialize().await.unwrap(), bytes);
        assert_eq!(restored.get(&"a".to_string()).await, Some(1));
    }

    #[test]
    fn test_malformed_snapshot_rejected() {
        let result = Cache::<String, i64>::deserialize(b"{\"entries\": [[\"a\"", 4);
        assert!(matches!(result, Err(CacheError::InvalidSnapshot(_))));

        let wrong_shape = Cache::<String, i64>::deserialize(br#"{"a": 1}"#, 4);
        assert!(matches!(wrong_shape, Err(CacheError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_zero_capacity_rejected_on_restore() {
        let result = Cache::<String, i64>::deserialize(br#"{"entries": []}"#, 0);
        assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
    }
}
