//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{CompressionConfig, EvictionPolicy, DEFAULT_COMPRESSION_LEVEL};
use crate::error::Result;

/// Default number of entries a cache holds.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default time-to-live for entries, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cache construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Eviction strategy once capacity is reached
    pub policy: EvictionPolicy,
    /// Maximum entry age; `None` or zero means entries never expire
    pub ttl: Option<Duration>,
    /// Sweep cadence override; derived from the TTL when unset
    pub sweep_interval: Option<Duration>,
    /// Compress stored values when set
    pub compression: Option<CompressionConfig>,
}

impl CacheConfig {
    /// Creates a config with the given capacity and defaults elsewhere.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries (default: 100)
    /// - `CACHE_POLICY` - `lru` or `lfu` (default: lru)
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds, 0 disables expiry (default: 300)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep cadence (default: half the TTL)
    /// - `CACHE_COMPRESSION` - `true`/`1` to compress values (default: false)
    /// - `CACHE_COMPRESSION_LEVEL` - gzip level (default: 6)
    ///
    /// Unparseable numbers fall back to their defaults. An unknown policy
    /// name is an error.
    pub fn from_env() -> Result<Self> {
        let policy = match env::var("CACHE_POLICY") {
            Ok(name) => name.parse()?,
            Err(_) => EvictionPolicy::default(),
        };

        let ttl_secs = parse_var("CACHE_TTL_SECS").unwrap_or(DEFAULT_TTL_SECS);
        let compression = env::var("CACHE_COMPRESSION")
            .ok()
            .filter(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .map(|_| CompressionConfig {
                level: parse_var("CACHE_COMPRESSION_LEVEL").unwrap_or(DEFAULT_COMPRESSION_LEVEL),
                ..CompressionConfig::default()
            });

        Ok(Self {
            capacity: parse_var("CACHE_CAPACITY").unwrap_or(DEFAULT_CAPACITY),
            policy,
            ttl: Some(Duration::from_secs(ttl_secs)).filter(|ttl| !ttl.is_zero()),
            sweep_interval: parse_var("CACHE_SWEEP_INTERVAL_SECS").map(Duration::from_secs),
            compression,
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: EvictionPolicy::Lru,
            ttl: Some(Duration::from_secs(DEFAULT_TTL_SECS)),
            sweep_interval: None,
            compression: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
