//! Long-poll watch mechanism for configuration files
//!
//! Clients declare the configuration files they hold together with the
//! release version they already have. The watch center answers each request
//! exactly once, with whichever comes first:
//!
//! 1. **Fast path**: the release cache already holds a newer version
//! 2. **Publish**: a newer release is published while the client waits
//! 3. **Expiry**: the hold time runs out ("no change")
//!
//! ```text
//! ┌──────────────┐  long_poll_watch()   ┌──────────────────┐
//! │  Transport   │ ───────────────────► │   WatchCenter    │
//! │ (HTTP/gRPC)  │ ◄─────────────────── │  fast path check │
//! └──────────────┘  Immediate/Pending   └────────┬─────────┘
//!                                                │ index
//!                                                ▼
//! ┌──────────────┐  PublishEvent        ┌──────────────────┐
//! │  Event bus   │ ───────────────────► │    Dispatcher    │ reply(file changed)
//! │ (bounded q)  │                      └──────────────────┘
//! └──────────────┘                      ┌──────────────────┐
//!                                       │  Expiry sweeper  │ reply(no change)
//!                                       └──────────────────┘
//! ```
//!
//! Stream subscriptions share the same index but stay registered after each
//! push, until the receiving side goes away.
//!
//! # Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use confwatch::{ClientFileInfo, LocalEventHub, MemoryFileCache, WatchCenter, WatchConfig, WatchOutcome};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let hub = LocalEventHub::new();
//! let cache = Arc::new(MemoryFileCache::new());
//! let center = WatchCenter::new(WatchConfig::default(), cache, &hub).unwrap();
//!
//! let files = vec![ClientFileInfo::new("default", "app", "db.yaml", 3)];
//! match center.long_poll_watch("client-1", files, Some(Duration::from_secs(30))).unwrap() {
//!     WatchOutcome::Immediate(rsp) => println!("answered at once: {:?}", rsp.code),
//!     WatchOutcome::Pending(handle) => {
//!         let rsp = handle.await_result(Duration::from_secs(31)).await;
//!         println!("resolved: {:?}", rsp.code);
//!     }
//! }
//! # });
//! ```

mod center;
mod context;

pub use center::*;
pub use context::*;
