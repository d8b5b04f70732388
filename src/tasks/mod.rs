//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Expiration sweep: removes entries older than the cache TTL

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperHandle};
