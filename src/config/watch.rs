use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_EVENT_QUEUE_SIZE;
use crate::constants::DEFAULT_LONG_POLL_TIMEOUT_MS;
use crate::constants::DEFAULT_MAX_LONG_POLL_TIMEOUT_MS;
use crate::constants::DEFAULT_STREAM_BUFFER_SIZE;
use crate::constants::DEFAULT_SWEEP_INTERVAL_MS;
use crate::Error;
use crate::Result;

/// Configuration for the long-poll watch center
///
/// Controls how long clients are held, how many publish events are buffered
/// between the event bus and the dispatcher, and how often expired long polls
/// are swept.
///
/// # Example (TOML)
/// ```toml
/// [watch]
/// long_poll_timeout_ms = 30000
/// max_long_poll_timeout_ms = 120000
/// event_queue_size = 10240
/// sweep_interval_ms = 1000
/// stream_buffer_size = 16
/// recheck_after_register = true
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Hold time applied when a client does not request one
    ///
    /// **Default**: 30000
    #[serde(default = "default_long_poll_timeout_ms")]
    pub long_poll_timeout_ms: u64,

    /// Upper bound for client requested hold times. Longer requests are clamped.
    ///
    /// **Default**: 120000
    #[serde(default = "default_max_long_poll_timeout_ms")]
    pub max_long_poll_timeout_ms: u64,

    /// Pending publish events buffered between the event bus and the dispatcher
    ///
    /// Sized to absorb publish bursts. When the queue is full the bus drops
    /// the event for this subscriber; affected clients are still resolved by
    /// the sweeper with "no change" and pick the release up on their next poll.
    ///
    /// **Default**: 10240
    #[serde(default = "default_event_queue_size")]
    pub event_queue_size: usize,

    /// Tick of the expiry sweeper. Long polls may overshoot their deadline by
    /// up to one tick.
    ///
    /// **Default**: 1000
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Push buffer per stream subscription
    ///
    /// **Default**: 16
    #[serde(default = "default_stream_buffer_size")]
    pub stream_buffer_size: usize,

    /// Re-read the release cache after a long poll is indexed
    ///
    /// Catches a release published between the fast-path check and the index
    /// insertion, which the dispatcher would otherwise miss.
    ///
    /// **Default**: true
    #[serde(default = "default_recheck_after_register")]
    pub recheck_after_register: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            long_poll_timeout_ms: default_long_poll_timeout_ms(),
            max_long_poll_timeout_ms: default_max_long_poll_timeout_ms(),
            event_queue_size: default_event_queue_size(),
            sweep_interval_ms: default_sweep_interval_ms(),
            stream_buffer_size: default_stream_buffer_size(),
            recheck_after_register: default_recheck_after_register(),
        }
    }
}

impl WatchConfig {
    /// Validates watch configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.long_poll_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.long_poll_timeout_ms must be greater than 0".into(),
            )));
        }

        if self.long_poll_timeout_ms > self.max_long_poll_timeout_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "watch.long_poll_timeout_ms ({}) must not exceed watch.max_long_poll_timeout_ms ({})",
                self.long_poll_timeout_ms, self.max_long_poll_timeout_ms
            ))));
        }

        if self.event_queue_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.event_queue_size must be greater than 0".into(),
            )));
        }

        if self.event_queue_size > 1_000_000 {
            warn!(
                "watch.event_queue_size ({}) is very large and may consume significant memory",
                self.event_queue_size
            );
        }

        if self.sweep_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.sweep_interval_ms must be greater than 0".into(),
            )));
        }

        if self.sweep_interval_ms > self.long_poll_timeout_ms {
            warn!(
                "watch.sweep_interval_ms ({}) exceeds long_poll_timeout_ms ({}). Long polls will overshoot their deadline by up to a full tick.",
                self.sweep_interval_ms, self.long_poll_timeout_ms
            );
        }

        if self.stream_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.stream_buffer_size must be greater than 0".into(),
            )));
        }

        Ok(())
    }

    pub fn long_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.long_poll_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Resolves the hold time for a request, falling back to the default and
    /// clamping to the configured maximum
    pub fn effective_timeout(
        &self,
        requested: Option<Duration>,
    ) -> Duration {
        let max = Duration::from_millis(self.max_long_poll_timeout_ms);
        match requested {
            Some(d) if !d.is_zero() => d.min(max),
            _ => self.long_poll_timeout(),
        }
    }
}

const fn default_long_poll_timeout_ms() -> u64 {
    DEFAULT_LONG_POLL_TIMEOUT_MS
}

const fn default_max_long_poll_timeout_ms() -> u64 {
    DEFAULT_MAX_LONG_POLL_TIMEOUT_MS
}

const fn default_event_queue_size() -> usize {
    DEFAULT_EVENT_QUEUE_SIZE
}

const fn default_sweep_interval_ms() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}

const fn default_stream_buffer_size() -> usize {
    DEFAULT_STREAM_BUFFER_SIZE
}

const fn default_recheck_after_register() -> bool {
    true
}
