//! Backend Module
//!
//! Translates between the values callers store and what [`Storage`]
//! physically holds. With compression off this is a pass-through; with it
//! on, values are JSON-encoded and gzip-compressed on the way in and
//! reversed on the way out.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::codec::{self, DEFAULT_COMPRESSION_LEVEL};
use crate::cache::{CacheEntry, EvictionPolicy, Storage};
use crate::error::Result;

// == Compression Config ==
/// Compression settings for stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// gzip level, 0-9
    pub level: u32,
    /// Encoded values shorter than this are stored uncompressed
    pub min_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_COMPRESSION_LEVEL,
            min_size: 0,
        }
    }
}

/// What storage physically holds for one value.
#[derive(Debug, Clone)]
enum Payload<V> {
    Plain(V),
    Packed(Vec<u8>),
}

// == Backend ==
#[derive(Debug)]
pub struct Backend<K, V> {
    storage: Storage<K, CacheEntry<Payload<V>>>,
    compression: Option<CompressionConfig>,
}

impl<K, V> Backend<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Serialize + DeserializeOwned,
{
    pub fn new(
        capacity: NonZeroUsize,
        policy: EvictionPolicy,
        compression: Option<CompressionConfig>,
    ) -> Self {
        Self {
            storage: Storage::new(capacity, policy),
            compression,
        }
    }

    // == Get ==
    /// Fetches and decodes an entry.
    ///
    /// A payload that fails to decode is logged, dropped from storage and
    /// reported as absent.
    pub fn get(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.storage.get(key)?.clone();
        match Self::decode(entry) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "dropping corrupted cache entry");
                self.storage.remove(key);
                None
            }
        }
    }

    // == Put ==
    /// Encodes and stores an entry, returning the evicted key if any.
    ///
    /// Values whose JSON form does not decode back into `V` (non-finite
    /// floats become `null`, for instance) are stored uncompressed.
    pub fn put(&mut self, key: K, entry: CacheEntry<V>) -> Result<Option<K>> {
        let entry = match self.compression {
            Some(config) => {
                let encoded = serde_json::to_vec(&entry.value)?;
                if encoded.len() < config.min_size {
                    entry.map(Payload::Plain)
                } else if serde_json::from_slice::<V>(&encoded).is_err() {
                    debug!("value does not survive JSON encoding, storing uncompressed");
                    entry.map(Payload::Plain)
                } else {
                    let packed = codec::compress(&encoded, config.level)?;
                    entry.map(|_| Payload::Packed(packed))
                }
            }
            None => entry.map(Payload::Plain),
        };
        Ok(self.storage.put(key, entry))
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.storage.remove(key).is_some()
    }

    // == Purge Expired ==
    /// Removes every entry older than `ttl` at `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, ttl: Option<Duration>) -> usize {
        if ttl.is_none() {
            return 0;
        }
        self.storage
            .retain(|_, entry| !entry.is_expired_at(now, ttl))
    }

    /// Timestamp of the first entry in storage iteration order.
    pub fn oldest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.storage.first().map(|(_, entry)| entry.stored_at)
    }

    // == Export ==
    /// Decodes all values, oldest first, without touching recency or usage.
    ///
    /// Entries that fail to decode are skipped with a warning.
    pub fn export(&self) -> Vec<(K, V)> {
        self.storage
            .iter()
            .filter_map(|(key, entry)| match Self::decode(entry.clone()) {
                Ok(entry) => Some((key.clone(), entry.value)),
                Err(err) => {
                    warn!(error = %err, "skipping corrupted cache entry during export");
                    None
                }
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Stores raw bytes as a packed payload, bypassing encoding.
    #[cfg(test)]
    pub(crate) fn put_packed_raw(&mut self, key: K, bytes: Vec<u8>) -> Option<K> {
        self.storage.put(key, CacheEntry::new(Payload::Packed(bytes)))
    }

    fn decode(entry: CacheEntry<Payload<V>>) -> Result<CacheEntry<V>> {
        let stored_at = entry.stored_at;
        let value = match entry.value {
            Payload::Plain(value) => value,
            Payload::Packed(bytes) => {
                let raw = codec::decompress(&bytes)?;
                serde_json::from_slice(&raw)?
            }
        };
        Ok(CacheEntry::stored_at(value, stored_at))
    }
}
