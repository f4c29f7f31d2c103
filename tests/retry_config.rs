//! Loading retry settings from provider configuration.
#![cfg(feature = "serde")]

use std::time::Duration;

use cachelite::retry::{PolicyError, Retrier, RetryConfig, StopPolicy};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProviderConfig {
    name: String,
    retry: RetryConfig,
}

#[test]
fn parses_timeout_policy() {
    let json = r#"{ "name": "redis-eu", "retry": { "timeout_ms": 1500 } }"#;
    let config: ProviderConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.name, "redis-eu");
    assert_eq!(
        config.retry.into_policy(),
        Ok(StopPolicy::timeout(Duration::from_millis(1500)))
    );
}

#[test]
fn parses_attempt_policy() {
    let config: RetryConfig = serde_json::from_str(r#"{ "max_attempts": 4 }"#).unwrap();
    let retrier = Retrier::from_config(config).unwrap();

    assert_eq!(retrier.policy(), StopPolicy::max_attempts(4));
}

#[test]
fn parses_forever() {
    let config: RetryConfig = serde_json::from_str(r#"{ "forever": true }"#).unwrap();

    assert!(config.into_policy().unwrap().is_unbounded());
}

#[test]
fn rejects_conflicting_bounds() {
    let config: RetryConfig =
        serde_json::from_str(r#"{ "timeout_ms": 10, "max_attempts": 2 }"#).unwrap();

    assert_eq!(config.into_policy(), Err(PolicyError::Conflicting));
}

#[test]
fn rejects_empty_config() {
    let config: RetryConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(config.into_policy(), Err(PolicyError::Missing));
}

#[test]
fn rejects_unknown_fields() {
    let result: Result<RetryConfig, _> = serde_json::from_str(r#"{ "retries": 3 }"#);

    assert!(result.is_err());
}

#[test]
fn serializes_from_policy() {
    let config = RetryConfig::from(StopPolicy::max_attempts(2));
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(value["max_attempts"], 2);
    assert_eq!(value["timeout_ms"], serde_json::Value::Null);
    assert_eq!(value["forever"], false);
}
