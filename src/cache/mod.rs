//! Cache Module
//!
//! Provides bounded in-memory caching with TTL expiration, LRU or LFU
//! eviction, optional value compression and async memoization.
//!
//! Layers, leaves first:
//! - [`Storage`] - fixed-capacity container with an eviction policy
//! - [`Backend`] - optional compression on the way in and out of storage
//! - [`Cache`] - TTL checks, hit/miss accounting and the cache-wide lock

mod backend;
pub mod codec;
mod entry;
mod lfu;
mod lru;
mod memoize;
mod snapshot;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use backend::{Backend, CompressionConfig};
pub use codec::DEFAULT_COMPRESSION_LEVEL;
pub use entry::CacheEntry;
pub use lfu::FrequencyTracker;
pub use lru::LruTracker;
pub use memoize::{memoize_key, Memoized};
pub use stats::CacheStats;
pub use storage::{EvictionPolicy, Storage};
pub use store::{Cache, DEFAULT_SWEEP_INTERVAL};
