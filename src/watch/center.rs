//! Watch center: interest index, publish dispatcher and expiry sweeper
//!
//! ```text
//! transport ──long_poll_watch()──► fast path (release cache)
//!                                    │ not stale
//!                                    ▼
//!                      clients:  client_id ─► WatchContext
//!                      watchers: file_key  ─► {client_id}
//!                                    ▲                 ▲
//!      event bus ─► dispatcher task ─┘                 └─ sweeper task (1s tick)
//!                   reply(file changed)                   reply(no change)
//! ```
//!
//! Whichever path resolves a long poll first wins; the registration's latch
//! absorbs the others. Every resolution removes the registration from both
//! maps.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::DashSet;
use parking_lot::Mutex;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::LongPollWatchContext;
use super::StreamWatchContext;
use super::WatchContext;
use crate::metrics::DISPATCH_LATENCY_MS;
use crate::metrics::EXPIRED_WATCHES;
use crate::metrics::NOTIFIED_CLIENTS;
use crate::metrics::QUICK_RESPONSES;
use crate::metrics::WATCHED_FILES;
use crate::metrics::WATCH_CLIENTS;
use crate::ClientFileInfo;
use crate::ConfigClientResponse;
use crate::ConfigFileCache;
use crate::ConfigFileRelease;
use crate::EventHub;
use crate::FileIdentity;
use crate::ResponseCode;
use crate::Result;
use crate::Subscription;
use crate::WatchConfig;
use crate::WatchError;
use crate::CONFIG_FILE_PUBLISH_TOPIC;

/// Result of a long poll request
#[derive(Debug)]
pub enum WatchOutcome {
    /// Answered at registration time; the client never entered the index
    Immediate(ConfigClientResponse),
    /// Registered; await the handle for the terminal response
    Pending(LongPollHandle),
}

static NEXT_CENTER_ID: AtomicU64 = AtomicU64::new(1);

/// Compares registrations by allocation, ignoring vtables
fn same_context(
    a: &Arc<dyn WatchContext>,
    b: &Arc<dyn WatchContext>,
) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Rejects watch requests that cannot be indexed
fn validate_watch_files(watch_files: &[ClientFileInfo]) -> Option<ConfigClientResponse> {
    if watch_files.is_empty() {
        return Some(ConfigClientResponse::invalid_request(
            ResponseCode::InvalidWatchConfigFileFormat,
            "watch files can not be empty",
        ));
    }
    if watch_files.iter().any(ClientFileInfo::is_incomplete) {
        return Some(ConfigClientResponse::invalid_request(
            ResponseCode::BadRequest,
            "namespace & group & fileName can not be empty",
        ));
    }
    None
}

/// Tracks which clients wait on which configuration files and resolves each
/// long poll exactly once
pub struct WatchCenter {
    /// Label of this center in the per-center gauges
    center_id: String,
    /// client_id -> registration
    clients: DashMap<String, Arc<dyn WatchContext>>,
    /// file_key -> interested client ids (secondary index of `clients`)
    watchers: DashMap<String, DashSet<String>>,
    /// Serializes index mutations so both maps change together
    index_lock: Mutex<()>,
    file_cache: Arc<dyn ConfigFileCache>,
    config: WatchConfig,
    shutdown_token: CancellationToken,
}

impl std::fmt::Debug for WatchCenter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatchCenter")
            .field("center_id", &self.center_id)
            .field("clients", &self.clients.len())
            .field("watched_files", &self.watchers.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WatchCenter {
    /// Subscribes to publish events and starts the dispatcher and sweeper tasks
    ///
    /// Must be called within a tokio runtime. The configuration is validated
    /// first. A subscription failure is returned as is; retrying is up to the
    /// caller.
    pub fn new(
        config: WatchConfig,
        file_cache: Arc<dyn ConfigFileCache>,
        event_hub: &dyn EventHub,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let subscription = event_hub.subscribe(CONFIG_FILE_PUBLISH_TOPIC, config.event_queue_size)?;

        let center = Arc::new(Self {
            center_id: NEXT_CENTER_ID.fetch_add(1, Ordering::Relaxed).to_string(),
            clients: DashMap::new(),
            watchers: DashMap::new(),
            index_lock: Mutex::new(()),
            file_cache,
            config,
            shutdown_token: CancellationToken::new(),
        });

        tokio::spawn(Self::run_dispatcher(
            Arc::downgrade(&center),
            subscription,
            center.shutdown_token.clone(),
        ));
        tokio::spawn(Self::run_sweeper(
            Arc::downgrade(&center),
            center.config.sweep_interval(),
            center.shutdown_token.clone(),
        ));

        info!(
            center_id = %center.center_id,
            queue_size = center.config.event_queue_size,
            sweep_interval_ms = center.config.sweep_interval_ms,
            "Watch center started"
        );
        Ok(center)
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Value of the `center` label this center reports its gauges under
    pub fn center_id(&self) -> &str {
        &self.center_id
    }

    // ==================== Fast path ====================

    /// Answers a watch request from the release cache when possible
    ///
    /// Returns an invalid-request response for malformed requests, a "file
    /// changed" response when the cache already holds a newer release of a
    /// watched file, and `None` when the client has to wait.
    pub fn check_quick_response(
        &self,
        watch_ctx: &dyn WatchContext,
    ) -> Option<ConfigClientResponse> {
        let watch_files = watch_ctx.list_watch_files();
        if let Some(rsp) = validate_watch_files(&watch_files) {
            return Some(rsp);
        }

        for file in &watch_files {
            let Some(release) =
                self.file_cache
                    .get_active_release(&file.namespace, &file.group, &file.file_name)
            else {
                continue;
            };
            if watch_ctx.should_notify(&release) {
                trace!(
                    client_id = %watch_ctx.client_id(),
                    file = %file.key(),
                    client_version = file.version,
                    version = release.version,
                    "Client holds a stale version"
                );
                return Some(ConfigClientResponse::file_changed(release.to_client_file_info()));
            }
        }
        None
    }

    /// Registers a long poll, answering immediately when the client is already stale
    ///
    /// `timeout` falls back to the configured default and is clamped to the
    /// configured maximum. Only one long poll per client id should be in
    /// flight: a second request for the same id joins the pending registration,
    /// whose deadline moves to the later of the two. A registration that was
    /// already resolved is replaced instead of joined.
    pub fn long_poll_watch(
        self: &Arc<Self>,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
        timeout: Option<Duration>,
    ) -> Result<WatchOutcome> {
        if self.shutdown_token.is_cancelled() {
            return Err(WatchError::ShuttingDown.into());
        }

        let timeout = self.config.effective_timeout(timeout);
        let candidate = Arc::new(LongPollWatchContext::new(client_id, timeout));
        for file in &watch_files {
            candidate.append_interest(file.clone());
        }

        if let Some(rsp) = self.check_quick_response(candidate.as_ref()) {
            let outcome = if rsp.is_changed() { "changed" } else { "invalid" };
            QUICK_RESPONSES.with_label_values(&[outcome]).inc();
            debug!(client_id, outcome, "Long poll answered at registration");
            return Ok(WatchOutcome::Immediate(rsp));
        }

        let deadline = candidate.finish_time();
        let candidate: Arc<dyn WatchContext> = candidate;
        let watch_ctx = {
            let _guard = self.index_lock.lock();
            // shutdown() cancels under this lock, so a registration is either
            // refused here or seen by its snapshot
            if self.shutdown_token.is_cancelled() {
                return Err(WatchError::ShuttingDown.into());
            }
            let streaming = self
                .clients
                .get(client_id)
                .map(|c| c.as_long_poll().is_none())
                .unwrap_or(false);
            if streaming {
                return Err(WatchError::DuplicateClient(client_id.to_string()).into());
            }
            let watch_ctx = self.index_locked(client_id, watch_files, |_| Arc::clone(&candidate));
            if !same_context(&watch_ctx, &candidate) {
                if let Some(long_poll) = watch_ctx.as_long_poll() {
                    long_poll.extend_deadline(deadline);
                }
            }
            watch_ctx
        };

        if self.config.recheck_after_register {
            self.recheck_registered(&watch_ctx);
        }

        Ok(WatchOutcome::Pending(LongPollHandle {
            client_id: client_id.to_string(),
            watch_ctx,
            center: Arc::downgrade(self),
        }))
    }

    /// Closes the window between the fast-path check and index insertion:
    /// a release published in between was dispatched before this client was
    /// in its bucket.
    fn recheck_registered(
        &self,
        watch_ctx: &Arc<dyn WatchContext>,
    ) {
        let Some(rsp) = self.check_quick_response(watch_ctx.as_ref()) else {
            return;
        };
        if !rsp.is_changed() {
            return;
        }
        if watch_ctx.reply(Arc::new(rsp)) {
            QUICK_RESPONSES.with_label_values(&["recheck"]).inc();
            debug!(client_id = %watch_ctx.client_id(), "Release published during registration");
        }
        self.remove_context(watch_ctx);
    }

    /// Opens a persistent push subscription
    ///
    /// Malformed requests are answered with a single invalid-request message on
    /// the returned stream, which then ends. Files that are already stale are
    /// pushed right away.
    pub fn subscribe_stream(
        self: &Arc<Self>,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
    ) -> Result<StreamSubscription> {
        if self.shutdown_token.is_cancelled() {
            return Err(WatchError::ShuttingDown.into());
        }

        if let Some(rsp) = validate_watch_files(&watch_files) {
            return Ok(StreamSubscription::rejected(client_id, rsp));
        }

        let (ctx, receiver) = StreamWatchContext::new(client_id, self.config.stream_buffer_size);
        let watch_ctx: Arc<dyn WatchContext> = Arc::new(ctx);

        {
            let _guard = self.index_lock.lock();
            if self.shutdown_token.is_cancelled() {
                return Err(WatchError::ShuttingDown.into());
            }
            if self.clients.contains_key(client_id) {
                return Err(WatchError::DuplicateClient(client_id.to_string()).into());
            }
            self.index_locked(client_id, watch_files, |_| Arc::clone(&watch_ctx));
        }

        for file in watch_ctx.list_watch_files() {
            if let Some(release) =
                self.file_cache
                    .get_active_release(&file.namespace, &file.group, &file.file_name)
            {
                if watch_ctx.should_notify(&release) {
                    watch_ctx.reply(Arc::new(ConfigClientResponse::file_changed(
                        release.to_client_file_info(),
                    )));
                }
            }
        }

        debug!(client_id, "Stream subscription registered");
        Ok(StreamSubscription {
            client_id: client_id.to_string(),
            receiver,
            watch_ctx,
            center: Arc::downgrade(self),
        })
    }

    // ==================== Interest index ====================

    /// Registers interest of `client_id` in `watch_files`
    ///
    /// Reuses the live registration of `client_id` if there is one, otherwise
    /// creates it with `factory`. A long poll that was already resolved but not
    /// yet unregistered does not count as live: it is detached and replaced.
    /// `factory` runs while the index is locked and must not call back into the
    /// center.
    pub fn add_watcher<F>(
        &self,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
        factory: F,
    ) -> Arc<dyn WatchContext>
    where
        F: FnOnce(&str) -> Arc<dyn WatchContext>,
    {
        let _guard = self.index_lock.lock();
        self.index_locked(client_id, watch_files, factory)
    }

    fn index_locked<F>(
        &self,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
        factory: F,
    ) -> Arc<dyn WatchContext>
    where
        F: FnOnce(&str) -> Arc<dyn WatchContext>,
    {
        let resolved = self
            .clients
            .get(client_id)
            .and_then(|c| c.as_long_poll().map(LongPollWatchContext::is_replied))
            .unwrap_or(false);
        if resolved {
            debug!(client_id, "Replacing resolved long poll");
            self.detach_locked(client_id, None);
        }

        let watch_ctx = Arc::clone(
            self.clients
                .entry(client_id.to_string())
                .or_insert_with(|| factory(client_id))
                .value(),
        );

        for file in watch_files {
            let file_key = file.key();
            watch_ctx.append_interest(file);
            self.watchers
                .entry(file_key)
                .or_default()
                .insert(client_id.to_string());
        }

        self.update_gauges();
        trace!(client_id, mode = watch_ctx.mode(), "Watcher registered");
        watch_ctx
    }

    /// Removes the registration of `client_id` and all its bucket entries
    ///
    /// Idempotent. Returns whether a registration was removed.
    pub fn remove_all_watcher(
        &self,
        client_id: &str,
    ) -> bool {
        let _guard = self.index_lock.lock();
        self.detach_locked(client_id, None).is_some()
    }

    /// Removes the registration of `client_id` while explicitly naming files
    ///
    /// A registration stands for one in-flight request, so the whole client is
    /// removed; the named buckets are cleaned as well, even if the interest set
    /// no longer lists them.
    pub fn remove_watcher(
        &self,
        client_id: &str,
        watch_files: &[ClientFileInfo],
    ) -> bool {
        let _guard = self.index_lock.lock();
        let removed = self.detach_locked(client_id, None).is_some();
        for file in watch_files {
            self.remove_from_bucket(&file.key(), client_id);
        }
        self.update_gauges();
        removed
    }

    /// Removes `watch_ctx` only if it is still the live registration of its client
    pub(crate) fn remove_context(
        &self,
        watch_ctx: &Arc<dyn WatchContext>,
    ) -> bool {
        let _guard = self.index_lock.lock();
        self.detach_locked(watch_ctx.client_id(), Some(watch_ctx)).is_some()
    }

    fn detach_locked(
        &self,
        client_id: &str,
        expected: Option<&Arc<dyn WatchContext>>,
    ) -> Option<Arc<dyn WatchContext>> {
        let (_, watch_ctx) = self.clients.remove_if(client_id, |_, current| {
            expected.map(|e| same_context(current, e)).unwrap_or(true)
        })?;

        watch_ctx.close();
        for file in watch_ctx.list_watch_files() {
            self.remove_from_bucket(&file.key(), client_id);
        }

        self.update_gauges();
        trace!(client_id, mode = watch_ctx.mode(), "Watcher unregistered");
        Some(watch_ctx)
    }

    /// Drops `client_id` from a bucket; an emptied bucket is removed in the
    /// same shard critical section
    fn remove_from_bucket(
        &self,
        file_key: &str,
        client_id: &str,
    ) {
        self.watchers.remove_if(file_key, |_, client_ids| {
            client_ids.remove(client_id);
            client_ids.is_empty()
        });
    }

    pub fn get_watch_context(
        &self,
        client_id: &str,
    ) -> Option<Arc<dyn WatchContext>> {
        self.clients.get(client_id).map(|c| Arc::clone(c.value()))
    }

    /// Number of live registrations
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of files with at least one interested client
    pub fn watched_file_count(&self) -> usize {
        self.watchers.len()
    }

    /// Number of clients in a file's bucket
    pub fn watcher_count(
        &self,
        file: &FileIdentity,
    ) -> usize {
        self.watchers.get(&file.key()).map(|w| w.len()).unwrap_or(0)
    }

    /// Whether `client_id` sits in the file's bucket
    pub fn is_watching(
        &self,
        client_id: &str,
        file: &FileIdentity,
    ) -> bool {
        self.watchers
            .get(&file.key())
            .map(|w| w.contains(client_id))
            .unwrap_or(false)
    }

    fn update_gauges(&self) {
        WATCH_CLIENTS
            .with_label_values(&[&self.center_id])
            .set(self.clients.len() as i64);
        WATCHED_FILES
            .with_label_values(&[&self.center_id])
            .set(self.watchers.len() as i64);
    }

    // ==================== Dispatch ====================

    /// Replies to every registration waiting on an older version of the
    /// released file
    ///
    /// All notified clients share one response. Single-shot registrations
    /// that got the reply leave the index. Returns the number of replies
    /// delivered.
    pub fn notify_to_watchers(
        &self,
        release: &ConfigFileRelease,
    ) -> usize {
        let file_key = release.active_key();
        // Snapshot so the bucket can shrink while we walk it
        let client_ids: Vec<String> = match self.watchers.get(&file_key) {
            Some(bucket) => bucket.iter().map(|c| c.key().clone()).collect(),
            None => return 0,
        };
        if client_ids.is_empty() {
            return 0;
        }

        info!(file = %file_key, version = release.version, "Received config file publish message");
        let start = std::time::Instant::now();

        let response = Arc::new(ConfigClientResponse::file_changed(release.to_client_file_info()));
        let mut notified = 0;

        for client_id in client_ids {
            let Some(watch_ctx) = self.get_watch_context(&client_id) else {
                info!(client_id = %client_id, file = %file_key, "Client not found when notifying");
                self.prune_departed(&file_key, &client_id);
                continue;
            };

            if !watch_ctx.should_notify(release) {
                continue;
            }

            if watch_ctx.reply(Arc::clone(&response)) {
                notified += 1;
                NOTIFIED_CLIENTS.with_label_values(&[watch_ctx.mode()]).inc();
            }

            if watch_ctx.is_once() {
                self.remove_context(&watch_ctx);
            }
        }

        DISPATCH_LATENCY_MS.observe(start.elapsed().as_secs_f64() * 1000.0);
        debug!(file = %file_key, version = release.version, notified, "Publish event dispatched");
        notified
    }

    /// Removes a bucket entry whose client has no registration any more
    fn prune_departed(
        &self,
        file_key: &str,
        client_id: &str,
    ) {
        let _guard = self.index_lock.lock();
        if !self.clients.contains_key(client_id) {
            self.remove_from_bucket(file_key, client_id);
            self.update_gauges();
        }
    }

    // ==================== Expiry ====================

    /// Resolves every expired registration with "no change" and removes it
    ///
    /// Returns the number of registrations removed.
    pub fn sweep_expired(
        &self,
        now: Instant,
    ) -> usize {
        if self.clients.is_empty() {
            return 0;
        }

        let expired: Vec<Arc<dyn WatchContext>> = self
            .clients
            .iter()
            .filter(|entry| entry.value().should_expire(now))
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for watch_ctx in &expired {
            if watch_ctx.reply(ConfigClientResponse::not_modified()) {
                EXPIRED_WATCHES.inc();
            }
            self.remove_context(watch_ctx);
        }

        if !expired.is_empty() {
            debug!(expired = expired.len(), live = self.clients.len(), "Expired watchers swept");
        }
        expired.len()
    }

    // ==================== Background tasks ====================

    async fn run_dispatcher(
        center: Weak<Self>,
        mut subscription: Subscription,
        shutdown_token: CancellationToken,
    ) {
        debug!(subscription_id = subscription.id(), "Watch dispatcher started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown_token.cancelled() => {
                    debug!("Watch dispatcher received shutdown signal");
                    break;
                }
                event = subscription.recv() => {
                    let Some(event) = event else {
                        warn!("Publish event subscription closed unexpectedly");
                        break;
                    };
                    let Some(center) = center.upgrade() else {
                        break;
                    };
                    center.notify_to_watchers(&event.release);
                }
            }
        }

        debug!("Watch dispatcher stopped");
    }

    async fn run_sweeper(
        center: Weak<Self>,
        period: Duration,
        shutdown_token: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_token.cancelled() => {
                    debug!("Expiry sweeper shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let Some(center) = center.upgrade() else {
                        break;
                    };
                    center.sweep_expired(Instant::now());
                }
            }
        }
    }

    // ==================== Shutdown ====================

    /// Stops the event subscription and the sweeper
    ///
    /// Pending registrations are resolved with "no change" so no caller is
    /// left waiting. Idempotent.
    pub fn shutdown(&self) {
        let pending: Vec<Arc<dyn WatchContext>> = {
            let _guard = self.index_lock.lock();
            if self.shutdown_token.is_cancelled() {
                return;
            }
            self.shutdown_token.cancel();
            self.clients.iter().map(|entry| Arc::clone(entry.value())).collect()
        };
        for watch_ctx in &pending {
            watch_ctx.reply(ConfigClientResponse::not_modified());
            self.remove_context(watch_ctx);
        }

        info!(released = pending.len(), "Watch center shut down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}

impl Drop for WatchCenter {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        let _ = WATCH_CLIENTS.remove_label_values(&[&self.center_id]);
        let _ = WATCHED_FILES.remove_label_values(&[&self.center_id]);
        debug!(center_id = %self.center_id, "WatchCenter dropped");
    }
}

/// Handle to a pending long poll
///
/// Dropping the handle before the poll is resolved unregisters the client,
/// which is how a transport reports an early disconnect.
pub struct LongPollHandle {
    client_id: String,
    watch_ctx: Arc<dyn WatchContext>,
    center: Weak<WatchCenter>,
}

impl std::fmt::Debug for LongPollHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LongPollHandle")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl LongPollHandle {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn watch_context(&self) -> &Arc<dyn WatchContext> {
        &self.watch_ctx
    }

    /// Waits up to `timeout` for the terminal response
    ///
    /// When the local wait runs out first the poll is resolved here with "no
    /// change"; if another path won the race in the meantime its response is
    /// returned instead.
    pub async fn await_result(
        &self,
        timeout: Duration,
    ) -> Arc<ConfigClientResponse> {
        let Some(long_poll) = self.watch_ctx.as_long_poll() else {
            return ConfigClientResponse::not_modified();
        };

        match long_poll.wait_result_with_timeout(timeout).await {
            Ok(rsp) => rsp,
            Err(_) => {
                self.watch_ctx.reply(ConfigClientResponse::not_modified());
                self.unregister();
                long_poll.result().unwrap_or_else(ConfigClientResponse::not_modified)
            }
        }
    }

    /// Unregisters the client. Safe to race with a reply in flight.
    pub fn cancel(self) {
        self.unregister();
    }

    fn unregister(&self) {
        if let Some(center) = self.center.upgrade() {
            center.remove_context(&self.watch_ctx);
        }
    }
}

impl Drop for LongPollHandle {
    fn drop(&mut self) {
        self.unregister();
    }
}

/// Receiving side of a stream subscription
///
/// Dropping it unregisters the client.
pub struct StreamSubscription {
    client_id: String,
    receiver: tokio::sync::mpsc::Receiver<Arc<ConfigClientResponse>>,
    watch_ctx: Arc<dyn WatchContext>,
    center: Weak<WatchCenter>,
}

impl std::fmt::Debug for StreamSubscription {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("StreamSubscription")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl StreamSubscription {
    /// Subscription that yields `rsp` once and then ends, never indexed
    pub(crate) fn rejected(
        client_id: &str,
        rsp: ConfigClientResponse,
    ) -> Self {
        let (ctx, receiver) = StreamWatchContext::new(client_id, 1);
        ctx.reply(Arc::new(rsp));
        ctx.close();
        Self {
            client_id: client_id.to_string(),
            receiver,
            watch_ctx: Arc::new(ctx),
            center: Weak::new(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Next pushed response; `None` once the subscription is closed
    pub async fn recv(&mut self) -> Option<Arc<ConfigClientResponse>> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Arc<ConfigClientResponse>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        if let Some(center) = self.center.upgrade() {
            center.remove_context(&self.watch_ctx);
        }
    }
}
