//! Cache Entry Module
//!
//! Defines a stored value together with the time it was written.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A value plus its freshness metadata.
///
/// `stored_at` is stamped by the cache at `put` time. Storage and backend
/// layers carry it through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Wall-clock time the value was written
    pub stored_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self::stored_at(value, Utc::now())
    }

    /// Creates an entry with an explicit timestamp.
    pub fn stored_at(value: V, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }

    // == Age ==
    /// Returns how long ago the entry was written, relative to `now`.
    ///
    /// A timestamp in the future (clock skew) yields a zero age.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// An entry is stale once its age strictly exceeds the TTL. `None`
    /// means entries never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.age_at(now) > ttl,
            None => false,
        }
    }

    /// Checks whether the entry is stale right now.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        self.is_expired_at(Utc::now(), ttl)
    }

    /// Replaces the value while keeping the timestamp.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> CacheEntry<U> {
        CacheEntry {
            value: f(self.value),
            stored_at: self.stored_at,
        }
    }
}
