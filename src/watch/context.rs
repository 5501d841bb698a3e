//! Watch registrations
//!
//! A registration holds what one client is waiting for: the files it watches
//! with the version it already has, and where its reply goes. Two variants share
//! the [`WatchContext`] contract:
//!
//! - [`LongPollWatchContext`]: single-shot. Resolved exactly once, by the first
//!   matching publish event or by expiry, then removed from the index.
//! - [`StreamWatchContext`]: persistent. Every matching publish is pushed to a
//!   bounded channel; it lives until the receiver goes away.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;

use crate::ClientFileInfo;
use crate::ConfigClientResponse;
use crate::ConfigFileRelease;
use crate::WatchError;

pub trait WatchContext: Send + Sync {
    fn client_id(&self) -> &str;

    /// Adds or overwrites the interest entry for the file's identity
    fn append_interest(
        &self,
        item: ClientFileInfo,
    );

    /// Drops the interest entry for the file's identity, if any
    fn remove_interest(
        &self,
        item: &ClientFileInfo,
    );

    /// True iff this registration watches the release's file with a strictly
    /// older version
    fn should_notify(
        &self,
        release: &ConfigFileRelease,
    ) -> bool;

    /// Delivers a reply. Returns whether the reply was accepted.
    fn reply(
        &self,
        rsp: Arc<ConfigClientResponse>,
    ) -> bool;

    /// Cleanup hook run when the registration leaves the index
    fn close(&self) {}

    fn should_expire(
        &self,
        now: Instant,
    ) -> bool;

    /// Snapshot of the current interest set
    fn list_watch_files(&self) -> Vec<ClientFileInfo>;

    /// Single-shot registrations leave the index after their first reply
    fn is_once(&self) -> bool;

    /// Label used in logs and metrics
    fn mode(&self) -> &'static str;

    fn as_long_poll(&self) -> Option<&LongPollWatchContext> {
        None
    }
}

/// Interest set keyed by canonical file key
#[derive(Debug, Default)]
struct InterestSet {
    files: RwLock<HashMap<String, ClientFileInfo>>,
}

impl InterestSet {
    fn append(
        &self,
        item: ClientFileInfo,
    ) {
        self.files.write().insert(item.key(), item);
    }

    fn remove(
        &self,
        item: &ClientFileInfo,
    ) {
        self.files.write().remove(&item.key());
    }

    fn is_stale(
        &self,
        release: &ConfigFileRelease,
    ) -> bool {
        self.files
            .read()
            .get(&release.active_key())
            .map(|watched| watched.version < release.version)
            .unwrap_or(false)
    }

    /// Moves the declared version forward after a delivery
    fn advance(
        &self,
        delivered: &ClientFileInfo,
    ) {
        if let Some(watched) = self.files.write().get_mut(&delivered.key()) {
            if watched.version < delivered.version {
                watched.version = delivered.version;
            }
        }
    }

    fn snapshot(&self) -> Vec<ClientFileInfo> {
        self.files.read().values().cloned().collect()
    }
}

/// Single-shot long poll registration
///
/// The delivery slot is a `watch` channel written at most once; the
/// `replied` latch decides which of the racing resolvers (dispatcher,
/// sweeper, recheck, local timeout) wins.
#[derive(Debug)]
pub struct LongPollWatchContext {
    client_id: String,
    finish_time: Mutex<Instant>,
    replied: AtomicBool,
    finish_tx: watch::Sender<Option<Arc<ConfigClientResponse>>>,
    interest: InterestSet,
}

impl LongPollWatchContext {
    /// Creates a registration expiring `timeout` from now
    pub fn new(
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::with_deadline(client_id, Instant::now() + timeout)
    }

    pub fn with_deadline(
        client_id: impl Into<String>,
        finish_time: Instant,
    ) -> Self {
        let (finish_tx, _) = watch::channel(None);
        Self {
            client_id: client_id.into(),
            finish_time: Mutex::new(finish_time),
            replied: AtomicBool::new(false),
            finish_tx,
            interest: InterestSet::default(),
        }
    }

    pub fn finish_time(&self) -> Instant {
        *self.finish_time.lock()
    }

    /// Moves the deadline to `deadline` if that is later. Never shortens it.
    pub fn extend_deadline(
        &self,
        deadline: Instant,
    ) {
        let mut finish_time = self.finish_time.lock();
        if deadline > *finish_time {
            *finish_time = deadline;
        }
    }

    pub fn is_replied(&self) -> bool {
        self.replied.load(Ordering::Acquire)
    }

    /// The terminal response, once resolved
    pub fn result(&self) -> Option<Arc<ConfigClientResponse>> {
        self.finish_tx.borrow().clone()
    }

    /// Waits until the registration is resolved
    pub async fn wait_result(&self) -> Arc<ConfigClientResponse> {
        let mut rx = self.finish_tx.subscribe();
        // The sender lives as long as `self`, so the wait can only end with a value.
        if let Ok(slot) = rx.wait_for(Option::is_some).await {
            if let Some(rsp) = slot.as_ref() {
                return Arc::clone(rsp);
            }
        }
        ConfigClientResponse::not_modified()
    }

    /// Waits at most `timeout` for the registration to be resolved
    pub async fn wait_result_with_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<Arc<ConfigClientResponse>, WatchError> {
        tokio::time::timeout(timeout, self.wait_result())
            .await
            .map_err(|_| WatchError::DeadlineExceeded(timeout))
    }
}

impl WatchContext for LongPollWatchContext {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn append_interest(
        &self,
        item: ClientFileInfo,
    ) {
        // Recorded even once resolved: unregistering walks this set to clean buckets
        self.interest.append(item);
    }

    fn remove_interest(
        &self,
        item: &ClientFileInfo,
    ) {
        self.interest.remove(item);
    }

    fn should_notify(
        &self,
        release: &ConfigFileRelease,
    ) -> bool {
        self.interest.is_stale(release)
    }

    fn reply(
        &self,
        rsp: Arc<ConfigClientResponse>,
    ) -> bool {
        if self
            .replied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(client_id = %self.client_id, "Long poll already resolved, reply absorbed");
            return false;
        }
        self.finish_tx.send_replace(Some(rsp));
        true
    }

    fn should_expire(
        &self,
        now: Instant,
    ) -> bool {
        now >= *self.finish_time.lock()
    }

    fn list_watch_files(&self) -> Vec<ClientFileInfo> {
        self.interest.snapshot()
    }

    fn is_once(&self) -> bool {
        true
    }

    fn mode(&self) -> &'static str {
        "long_poll"
    }

    fn as_long_poll(&self) -> Option<&LongPollWatchContext> {
        Some(self)
    }
}

/// Persistent push registration
///
/// Each accepted change advances the declared version of that file, so a
/// redelivered publish event is not pushed twice.
#[derive(Debug)]
pub struct StreamWatchContext {
    client_id: String,
    sender: Mutex<Option<mpsc::Sender<Arc<ConfigClientResponse>>>>,
    interest: InterestSet,
}

impl StreamWatchContext {
    pub fn new(
        client_id: impl Into<String>,
        buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Arc<ConfigClientResponse>>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let ctx = Self {
            client_id: client_id.into(),
            sender: Mutex::new(Some(sender)),
            interest: InterestSet::default(),
        };
        (ctx, receiver)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().as_ref().map(|s| s.is_closed()).unwrap_or(true)
    }
}

impl WatchContext for StreamWatchContext {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn append_interest(
        &self,
        item: ClientFileInfo,
    ) {
        self.interest.append(item);
    }

    fn remove_interest(
        &self,
        item: &ClientFileInfo,
    ) {
        self.interest.remove(item);
    }

    fn should_notify(
        &self,
        release: &ConfigFileRelease,
    ) -> bool {
        self.interest.is_stale(release)
    }

    fn reply(
        &self,
        rsp: Arc<ConfigClientResponse>,
    ) -> bool {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return false;
        };

        let delivered = rsp.config_file.clone();
        match sender.try_send(rsp) {
            Ok(()) => {
                if let Some(file) = delivered {
                    self.interest.advance(&file);
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(client_id = %self.client_id, "Stream buffer full, reply dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn close(&self) {
        self.sender.lock().take();
    }

    fn should_expire(
        &self,
        _now: Instant,
    ) -> bool {
        self.is_closed()
    }

    fn list_watch_files(&self) -> Vec<ClientFileInfo> {
        self.interest.snapshot()
    }

    fn is_once(&self) -> bool {
        false
    }

    fn mode(&self) -> &'static str {
        "stream"
    }
}
