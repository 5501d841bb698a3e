//! Watch Center Error Hierarchy
//!
//! Defines the error types surfaced by the watch center, categorized by the
//! collaborator or subsystem that produced them.
//!
//! Request-level problems (malformed watch requests, timeouts, denied access)
//! are not errors: they are answered with a structured
//! [`ConfigClientResponse`](crate::ConfigClientResponse).

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Event bus subscription failures
    #[error(transparent)]
    EventBus(#[from] EventBusError),

    /// Long-poll wait failures
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventBusError {
    /// Topic was shut down and accepts no more subscribers or events
    #[error("Topic {0} is closed")]
    TopicClosed(String),

    /// Subscriber queues must hold at least one event
    #[error("Invalid queue size {0} for topic subscription")]
    InvalidQueueSize(usize),

    /// Subscription was already cancelled
    #[error("Subscription {id} on topic {topic} already cancelled")]
    AlreadyCancelled { topic: String, id: u64 },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WatchError {
    /// No terminal response arrived before the local wait deadline
    #[error("Watch result not available after {0:?}")]
    DeadlineExceeded(Duration),

    /// Watch center is shutting down and accepts no new registrations
    #[error("Watch center is shutting down")]
    ShuttingDown,

    /// A stream subscription already exists for this client id
    #[error("Client {0} already holds a watch registration")]
    DuplicateClient(String),
}
