//! TTL Cache - a concurrency-safe in-process cache
//!
//! Bounded key/value caching with TTL expiration, LRU or LFU eviction,
//! optional compression, background sweeping and async memoization.

pub mod cache;
pub mod config;
pub mod error;
pub mod shell;
pub mod tasks;

pub use cache::{Cache, CacheStats, EvictionPolicy, Memoized};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::{spawn_sweeper, SweeperHandle};
