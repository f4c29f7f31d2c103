//! Shows the retry and dispatch events emitted under the `tracing` feature.
//!
//! Run with: cargo run --example tracing_demo --features tracing

use std::time::Duration;

use cachelite::dispatch::exec_all;
use cachelite::retry::{retry_on_error, retry_on_error_n, Retrier, StopPolicy};
use cachelite::testing::{FlakyOperation, MemoryCache};
use cachelite::RemoveByPattern;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("connecting to a warming replica");
    let connect = FlakyOperation::new(2, "replica warming up");
    match retry_on_error(|| connect.call(), Some(Duration::from_secs(1))) {
        Ok(attempt) => tracing::info!(attempt, "connected"),
        Err(e) => tracing::error!("connect failed: {}", e),
    }

    tracing::info!("writing through a replica that never comes up");
    let down = FlakyOperation::always_failing("replica offline");
    if let Err(e) = retry_on_error_n(|| down.call(), 3) {
        tracing::error!("write failed: {}", e);
    }

    tracing::info!("polling with a short deadline");
    let retrier = Retrier::new(StopPolicy::timeout(Duration::from_millis(20)));
    if let Err(e) = retrier.until_true(|| false) {
        tracing::warn!("gave up: {}", e);
    }

    let replicas: Vec<MemoryCache> = (0..3)
        .map(|_| {
            [("user:1", "ada"), ("user:2", "grace"), ("order:9", "book")]
                .into_iter()
                .collect()
        })
        .collect();

    let evicted = exec_all(&replicas, |replica| {
        replica.remove_by_pattern("user:*").map(|_| ())
    });
    tracing::info!(ok = evicted.is_ok(), "evicted users from every replica");
}
