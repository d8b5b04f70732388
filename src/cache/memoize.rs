//! Memoization Module
//!
//! Wraps an async computation so its results are cached under a key derived
//! from the call's arguments.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::Result;

// == Key Derivation ==
/// Derives a stable cache key from a namespace and an argument list.
///
/// The key is the lowercase hex SHA-256 of the namespace bytes, a `0x00`
/// separator and the JSON encoding of `args`.
pub fn memoize_key<A>(namespace: Option<&str>, args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    let encoded = serde_json::to_vec(args)?;
    let mut hasher = Sha256::new();
    hasher.update(namespace.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

// == Memoized ==
/// A memoized async function.
///
/// The wrapped function runs outside the cache lock. Concurrent calls with
/// identical arguments are not deduplicated: each miss runs the function.
pub struct Memoized<V, F> {
    cache: Cache<String, V>,
    namespace: Option<String>,
    func: F,
}

impl<V> Cache<String, V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Memoizes `func` keyed on its arguments only.
    pub fn memoize<F>(&self, func: F) -> Memoized<V, F> {
        Memoized {
            cache: self.clone(),
            namespace: None,
            func,
        }
    }

    /// Memoizes `func` under `name`, so functions sharing a cache do not
    /// collide on equal arguments.
    pub fn memoize_named<F>(&self, name: impl Into<String>, func: F) -> Memoized<V, F> {
        Memoized {
            cache: self.clone(),
            namespace: Some(name.into()),
            func,
        }
    }
}

impl<V, F> Memoized<V, F>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Returns the cached result for `args`, computing and storing it on a
    /// miss.
    ///
    /// Errors from the wrapped function are returned unchanged and never
    /// cached.
    pub async fn call<A, Fut, E>(&self, args: A) -> std::result::Result<V, E>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let key = match memoize_key(self.namespace.as_deref(), &args) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "cannot derive memoization key, calling uncached");
                return (self.func)(args).await;
            }
        };

        if let Some(value) = self.cache.get(&key).await {
            debug!(key = %key, "memoized result served from cache");
            return Ok(value);
        }

        let value = (self.func)(args).await?;
        if let Err(err) = self.cache.put(key, value.clone()).await {
            warn!(error = %err, "failed to store memoized result");
        }
        Ok(value)
    }

    /// The cache backing this wrapper.
    pub fn cache(&self) -> &Cache<String, V> {
        &self.cache
    }
}
