// -
// Event bus topics

/// Topic carrying "config file republished" events
pub const CONFIG_FILE_PUBLISH_TOPIC: &str = "config_file_publish";

// -
// Watch defaults

/// Long poll hold time when the client does not ask for one (ms)
pub(crate) const DEFAULT_LONG_POLL_TIMEOUT_MS: u64 = 30_000;

/// Upper bound for a client-requested long poll hold time (ms)
pub(crate) const DEFAULT_MAX_LONG_POLL_TIMEOUT_MS: u64 = 120_000;

/// Pending publish events buffered per subscriber
pub(crate) const DEFAULT_EVENT_QUEUE_SIZE: usize = 10_240;

/// Expiry sweeper tick (ms)
pub(crate) const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Per-subscription push buffer for stream watchers
pub(crate) const DEFAULT_STREAM_BUFFER_SIZE: usize = 16;

/// Separator used to build the canonical file identity key
pub(crate) const FILE_KEY_SEPARATOR: char = '+';
