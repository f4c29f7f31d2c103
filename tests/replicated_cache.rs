//! End-to-end tests: retry loops and dispatch wrapped around cache providers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cachelite::cache::{CacheError, DeflateProvider, FlateFormat, FlateProvider, RemoveByPattern};
use cachelite::dispatch::{exec_all, exec_all_with_first_out, exec_return_first_with_result};
use cachelite::prelude::*;
use cachelite::testing::{FlakyOperation, MemoryCache};
use cachelite::{assert_retried, assert_timed_out};

/// A provider that refuses the first few evictions, like a replica that is
/// still warming up.
struct WarmingReplica {
    inner: MemoryCache,
    refusals: AtomicU32,
}

impl WarmingReplica {
    fn new(refusals: u32, keys: &[&str]) -> Self {
        Self {
            inner: keys.iter().map(|k| (*k, "v")).collect(),
            refusals: AtomicU32::new(refusals),
        }
    }

    fn refuse(&self) -> Result<(), CacheError> {
        let left = self.refusals.load(Ordering::SeqCst);
        if left > 0 {
            self.refusals.store(left - 1, Ordering::SeqCst);
            Err(CacheError::Compression(std::io::Error::other("replica warming up")))
        } else {
            Ok(())
        }
    }
}

impl RemoveByPattern for WarmingReplica {
    fn remove_by_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        self.refuse()?;
        self.inner.remove_by_pattern(pattern)
    }

    fn remove_by_regex(&self, regex: &str) -> Result<usize, CacheError> {
        self.refuse()?;
        self.inner.remove_by_regex(regex)
    }
}

#[test]
fn remove_by_pattern_leaves_other_keys() {
    let cache = MemoryCache::from_iter([("user:1", "a"), ("user:2", "b"), ("order:1", "c")]);

    cache.remove_by_pattern("user:*").unwrap();

    assert_eq!(cache.keys(), vec!["order:1"]);
}

#[test]
fn deflate_round_trips_multibyte_text() {
    for format in [FlateFormat::Deflate, FlateFormat::Zlib, FlateFormat::Gzip] {
        let provider = FlateProvider::new(format);
        for text in [
            "",
            "plain ascii",
            "日本語のキャッシュ",
            "emoji 🚀🦀 mixed ünïcödé",
        ] {
            let packed = provider.deflate(text).unwrap();
            assert_eq!(provider.inflate(&packed).unwrap(), text);
        }
    }
}

#[test]
fn eviction_is_retried_until_replica_accepts() {
    let replica = WarmingReplica::new(2, &["user:1", "user:2", "order:1"]);

    let removed = retry_on_error(
        || replica.remove_by_pattern("user:*"),
        Some(Duration::from_secs(5)),
    )
    .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(replica.inner.keys(), vec!["order:1"]);
}

#[test]
fn eviction_attempt_budget_surfaces_provider_error() {
    let replica = WarmingReplica::new(10, &["user:1"]);

    let err = retry_on_error_n(|| replica.remove_by_regex("^user:"), 3).unwrap_err();

    assert!(matches!(err, CacheError::Compression(_)));
    assert!(replica.inner.contains_key("user:1"));
}

#[test]
fn evict_on_every_replica_with_retries() {
    let replicas = [
        WarmingReplica::new(0, &["user:1", "order:1"]),
        WarmingReplica::new(1, &["user:2", "order:2"]),
        WarmingReplica::new(2, &["user:3"]),
    ];
    let retrier = Retrier::new(StopPolicy::max_attempts(5));

    exec_all(&replicas, |replica| {
        retrier
            .run(|| replica.remove_by_pattern("user:*"))
            .map(|_| ())
    })
    .unwrap();

    let remaining: Vec<_> = replicas.iter().flat_map(|r| r.inner.keys()).collect();
    assert_eq!(remaining, vec!["order:1", "order:2"]);
}

#[test]
fn exec_all_stops_at_failing_replica() {
    let replicas = [
        WarmingReplica::new(0, &["user:1"]),
        WarmingReplica::new(1, &["user:2"]),
        WarmingReplica::new(0, &["user:3"]),
    ];

    let result = exec_all(&replicas, |r| r.remove_by_pattern("user:*").map(|_| ()));

    assert!(result.is_err());
    assert!(!replicas[0].inner.contains_key("user:1"));
    assert!(replicas[1].inner.contains_key("user:2"));
    assert!(replicas[2].inner.contains_key("user:3"));
}

#[test]
fn read_from_first_replica_with_a_hit() {
    let replicas = [
        MemoryCache::new(),
        MemoryCache::from_iter([("user:1", "from-b")]),
        MemoryCache::from_iter([("user:1", "from-c")]),
    ];
    let lookups = AtomicU32::new(0);

    let hit = exec_return_first_with_result(&replicas, |r| {
        lookups.fetch_add(1, Ordering::SeqCst);
        r.get("user:1")
    });

    assert_eq!(hit, Some("from-b".to_string()));
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn write_all_replicas_reporting_first_previous_value() {
    let replicas = [
        MemoryCache::new(),
        MemoryCache::from_iter([("k", "old-b")]),
        MemoryCache::from_iter([("k", "old-c")]),
    ];
    let mut previous = None;

    exec_all_with_first_out(&replicas, |r| r.insert("k", "new"), &mut previous);

    assert_eq!(previous, Some("old-b".to_string()));
    assert!(replicas.iter().all(|r| r.get("k") == Some("new".to_string())));
}

#[test]
fn retry_until_flag_flips() {
    let flaky = FlakyOperation::new(2, ());

    retry_until_true(|| flaky.poll(), Some(Duration::from_secs(5))).unwrap();

    assert_retried!(flaky, 3);
}

#[test]
fn retry_never_succeeding_times_out() {
    let flaky = FlakyOperation::always_failing("connection refused");

    let result = retry_on_error(|| flaky.call(), Some(Duration::from_millis(25)));

    assert!(flaky.calls() >= 1);
    assert_timed_out!(result);
}
