//! Long-poll watch center for configuration files
//!
//! Service-mesh sidecars and SDKs ask "tell me when any of these files gets a
//! release newer than the one I hold". [`WatchCenter`] answers each request
//! exactly once: from the release cache when the client is already stale, on
//! the next matching publish event, or with "no change" when the hold time
//! runs out.
//!
//! Transports (HTTP, gRPC) live outside this crate and drive it through
//! [`WatchCenter::long_poll_watch`] and [`WatchCenter::subscribe_stream`], or
//! through [`AuthorizedWatchService`] when a permission gate is needed.

mod auth;
mod cache;
mod config;
mod constants;
mod errors;
mod eventhub;
mod metrics;
mod model;
mod watch;

pub use auth::*;
pub use cache::*;
pub use crate::config::*;
pub use constants::CONFIG_FILE_PUBLISH_TOPIC;
pub use errors::*;
pub use eventhub::*;
pub use metrics::gather_metrics;
pub use model::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
