use std::time::Duration;

use super::*;

#[test]
fn validate_rejects_zero_long_poll_timeout() {
    let config = WatchConfig {
        long_poll_timeout_ms: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_default_timeout_above_max() {
    let config = WatchConfig {
        long_poll_timeout_ms: 60_000,
        max_long_poll_timeout_ms: 30_000,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_sweep_interval() {
    let config = WatchConfig {
        sweep_interval_ms: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_stream_buffer() {
    let config = WatchConfig {
        stream_buffer_size: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_accepts_sweep_interval_longer_than_timeout() {
    let config = WatchConfig {
        long_poll_timeout_ms: 500,
        sweep_interval_ms: 2_000,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn effective_timeout_falls_back_to_default() {
    let config = WatchConfig::default();

    assert_eq!(config.effective_timeout(None), Duration::from_secs(30));
    assert_eq!(
        config.effective_timeout(Some(Duration::ZERO)),
        Duration::from_secs(30)
    );
}

#[test]
fn effective_timeout_clamps_to_max() {
    let config = WatchConfig::default();

    assert_eq!(
        config.effective_timeout(Some(Duration::from_secs(5))),
        Duration::from_secs(5)
    );
    assert_eq!(
        config.effective_timeout(Some(Duration::from_secs(600))),
        Duration::from_millis(config.max_long_poll_timeout_ms)
    );
}
