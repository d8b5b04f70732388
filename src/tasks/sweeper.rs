//! Expiration Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Handle to a running sweeper.
///
/// Dropping the handle stops the sweeper. The task also exits by itself
/// once every clone of its cache has been dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl SweeperHandle {
    /// Stops the sweeper.
    ///
    /// Cancellation lands on an `.await`, and a sweep pass awaits nothing
    /// once it holds the cache lock, so the lock is never left held.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a background task that sweeps `cache` every
/// [`Cache::sweep_interval`].
///
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let cache = Cache::with_policy(1000, EvictionPolicy::Lru, Some(Duration::from_secs(60)))?;
/// let sweeper = spawn_sweeper(&cache);
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweeper<K, V>(cache: &Cache<K, V>) -> SweeperHandle
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    let interval = cache.sweep_interval();
    let weak = cache.downgrade();

    let handle = tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting expiration sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = weak.upgrade() else {
                info!("cache dropped, stopping expiration sweeper");
                break;
            };
            let removed = cache.purge_expired().await;
            drop(cache);

            if removed > 0 {
                info!(removed, "expiration sweep removed stale entries");
            } else {
                debug!("expiration sweep found no stale entries");
            }
        }
    });

    SweeperHandle { handle, interval }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    /// Starts the background expiration sweeper for this cache.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        spawn_sweeper(self)
    }
}
