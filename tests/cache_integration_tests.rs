//! Integration Tests for the public cache API
//!
//! Exercises the cache the way a fetcher or extractor would: through
//! `get`/`put`/`stats`, memoized calls, the sweeper and snapshots.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ttl_cache::cache::CompressionConfig;
use ttl_cache::shell::{Reply, Session};
use ttl_cache::{Cache, CacheConfig, CacheError, EvictionPolicy};

// == Helper Functions ==

fn lru(capacity: usize) -> Cache<String, i32> {
    Cache::with_policy(capacity, EvictionPolicy::Lru, None).unwrap()
}

fn key(s: &str) -> String {
    s.to_string()
}

// == Construction ==

#[test]
fn test_invalid_capacity_is_a_construction_error() {
    let err = Cache::<String, i32>::with_policy(0, EvictionPolicy::Lfu, None).unwrap_err();
    assert!(matches!(err, CacheError::InvalidCapacity(0)));
}

#[test]
fn test_unknown_policy_name_is_a_construction_error() {
    let err = "mru".parse::<EvictionPolicy>().unwrap_err();
    assert!(matches!(err, CacheError::UnknownPolicy(_)));
}

// == Eviction Scenarios ==

#[tokio::test]
async fn test_lru_capacity_two_scenario() {
    let cache = lru(2);
    cache.put(key("a"), 1).await.unwrap();
    cache.put(key("b"), 2).await.unwrap();
    cache.put(key("c"), 3).await.unwrap();

    assert_eq!(cache.get(&key("a")).await, None);
    assert_eq!(cache.get(&key("b")).await, Some(2));
    assert_eq!(cache.get(&key("c")).await, Some(3));
}

#[tokio::test]
async fn test_lfu_read_key_outlives_unread_key() {
    let cache: Cache<String, i32> = Cache::with_policy(10, EvictionPolicy::Lfu, None).unwrap();
    cache.put(key("x"), 1).await.unwrap();
    for _ in 0..3 {
        cache.get(&key("x")).await;
    }
    cache.put(key("y"), 2).await.unwrap();
    cache.put(key("z"), 3).await.unwrap();
    for i in 0..8 {
        cache.put(format!("filler-{i}"), i).await.unwrap();
    }

    assert_eq!(cache.len().await, 10);
    assert_eq!(cache.get(&key("y")).await, None);
    assert_eq!(cache.get(&key("x")).await, Some(1));
}

#[tokio::test]
async fn test_repeated_writes_keep_hot_key_alive() {
    let cache = lru(3);
    for i in 0..20 {
        cache.put(key("hot"), i).await.unwrap();
        cache.put(format!("cold-{i}"), i).await.unwrap();
    }
    assert_eq!(cache.get(&key("hot")).await, Some(19));
}

// == TTL ==

#[tokio::test]
async fn test_ttl_round_trip() {
    let cache: Cache<String, String> =
        Cache::with_policy(10, EvictionPolicy::Lru, Some(Duration::from_millis(60))).unwrap();
    cache.put(key("page"), key("<html>")).await.unwrap();
    assert_eq!(cache.get(&key("page")).await, Some(key("<html>")));

    tokio::time::sleep(Duration::from_millis(150)).await;

    let misses_before = cache.stats().await.misses;
    assert_eq!(cache.get(&key("page")).await, None);
    assert_eq!(cache.stats().await.misses, misses_before + 1);
}

#[tokio::test]
async fn test_sweeper_bounds_memory_without_reads() {
    let config = CacheConfig::new(50)
        .with_ttl(Some(Duration::from_millis(40)))
        .with_sweep_interval(Duration::from_millis(20));
    let cache: Cache<String, i32> = Cache::new(config).unwrap();
    let sweeper = cache.spawn_sweeper();

    for i in 0..20 {
        cache.put(format!("k{i}"), i).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(250)).await;

    let stats = cache.stats().await;
    assert_eq!(stats.size, 0);
    assert_eq!(stats.expirations, 20);
    assert_eq!(stats.hits + stats.misses, 0);
    sweeper.stop();
}

// == Stats ==

#[tokio::test]
async fn test_stats_accuracy() {
    let cache = lru(10);
    for i in 0..5 {
        cache.put(format!("k{i}"), i).await.unwrap();
    }
    for i in 0..5 {
        assert!(cache.get(&format!("k{i}")).await.is_some());
    }
    for i in 5..8 {
        assert!(cache.get(&format!("k{i}")).await.is_none());
    }

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 5);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.size, 5);
    assert!(stats.oldest_entry_timestamp.is_some());
    assert!((stats.hit_rate() - 0.625).abs() < f64::EPSILON);
}

// == Memoization ==

#[tokio::test]
async fn test_memoized_fetch_hits_cache_on_repeat() {
    let cache: Cache<String, Vec<String>> = Cache::new(
        CacheConfig::new(100).with_compression(CompressionConfig::default()),
    )
    .unwrap();
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);

    let schedule = cache.memoize_named("schedule", move |(date, page): (String, u32)| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(vec![format!("{date}#{page}: home at away")])
        }
    });

    let first = schedule.call((key("2024-05-01"), 1)).await.unwrap();
    let second = schedule.call((key("2024-05-01"), 1)).await.unwrap();
    let other_page = schedule.call((key("2024-05-01"), 2)).await.unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other_page);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_memoize_has_no_single_flight() {
    let cache: Cache<String, u64> = Cache::with_policy(8, EvictionPolicy::Lru, None).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let slow = Arc::new(cache.memoize(move |n: u64| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, ()>(n * 2)
        }
    }));

    let (a, b) = tokio::join!(slow.call(21), slow.call(21));
    assert_eq!((a, b), (Ok(42), Ok(42)));
    // Both concurrent misses ran the function
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(slow.call(21).await, Ok(42));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// == Snapshots ==

#[tokio::test]
async fn test_snapshot_round_trip_resets_ages() {
    let cache: Cache<String, String> =
        Cache::with_policy(4, EvictionPolicy::Lru, Some(Duration::from_secs(60))).unwrap();
    cache.put(key("a"), key("alpha")).await.unwrap();
    cache.put(key("b"), key("beta")).await.unwrap();
    cache.get(&key("a")).await;

    let bytes = cache.serialize().await.unwrap();
    let restored: Cache<String, String> = Cache::deserialize(&bytes, 4).unwrap();

    assert_eq!(restored.get(&key("a")).await, Some(key("alpha")));
    assert_eq!(restored.get(&key("b")).await, Some(key("beta")));
    assert_eq!(restored.stats().await.hits, 2);
}

#[test]
fn test_corrupt_snapshot_is_fatal() {
    let err = Cache::<String, String>::deserialize(b"not json at all", 4).unwrap_err();
    assert!(matches!(err, CacheError::InvalidSnapshot(_)));
}

// == Shell ==

#[tokio::test]
async fn test_shell_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let path = path.to_str().unwrap();

    let mut session = Session::new(CacheConfig::new(4)).unwrap();
    session.start_sweeper();
    session.handle_line("PUT team Chicago Cubs").await;
    session.handle_line("PUT rank 3").await;

    assert!(matches!(
        session.handle_line(&format!("SAVE {path}")).await,
        Reply::Text(text) if text.starts_with("saved")
    ));

    session.handle_line("CLEAR").await;
    assert_eq!(session.handle_line("GET team").await, Reply::Text("(nil)".into()));

    assert_eq!(
        session.handle_line(&format!("LOAD {path}")).await,
        Reply::Text(format!("loaded 2 entries from {path}"))
    );
    assert_eq!(
        session.handle_line("GET team").await,
        Reply::Text("Chicago Cubs".into())
    );
}

#[tokio::test]
async fn test_shell_rejects_corrupt_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{\"entries\": 7}").unwrap();

    let mut session = Session::new(CacheConfig::new(4)).unwrap();
    session.handle_line("PUT keep me").await;

    let reply = session
        .handle_line(&format!("LOAD {}", path.to_str().unwrap()))
        .await;
    assert!(matches!(reply, Reply::Error(message) if message.starts_with("Invalid snapshot")));
    assert_eq!(session.handle_line("GET keep").await, Reply::Text("me".into()));
}
