//! Permission gate in front of the watch center
//!
//! The gate runs before any registration happens: a denied request is answered
//! with an "unauthorized" response and never reaches the index.


use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::ClientFileInfo;
use crate::ConfigClientResponse;
use crate::FileIdentity;
use crate::Result;
use crate::StreamSubscription;
use crate::WatchCenter;
use crate::WatchOutcome;

/// What a client asks to watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchAuthContext {
    pub client_id: String,
    pub files: Vec<FileIdentity>,
}

impl WatchAuthContext {
    pub fn new(
        client_id: &str,
        watch_files: &[ClientFileInfo],
    ) -> Self {
        Self {
            client_id: client_id.to_string(),
            files: watch_files.iter().map(ClientFileInfo::identity).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Client may not read the named file
    #[error("Client {client_id} is not allowed to read {file}")]
    FileDenied { client_id: String, file: String },

    /// Client could not be identified
    #[error("Client {0} is not authenticated")]
    Unauthenticated(String),
}

#[cfg_attr(test, automock)]
pub trait AuthChecker: Send + Sync + 'static {
    fn check_permission(
        &self,
        ctx: &WatchAuthContext,
    ) -> std::result::Result<(), AuthError>;
}

/// Grants every request
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AuthChecker for AllowAll {
    fn check_permission(
        &self,
        _ctx: &WatchAuthContext,
    ) -> std::result::Result<(), AuthError> {
        Ok(())
    }
}

/// [`WatchCenter`] front door that checks read permission first
pub struct AuthorizedWatchService {
    center: Arc<WatchCenter>,
    checker: Arc<dyn AuthChecker>,
}

impl std::fmt::Debug for AuthorizedWatchService {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("AuthorizedWatchService")
            .field("center", &self.center)
            .finish_non_exhaustive()
    }
}

impl AuthorizedWatchService {
    pub fn new(
        center: Arc<WatchCenter>,
        checker: Arc<dyn AuthChecker>,
    ) -> Self {
        Self { center, checker }
    }

    /// Gate that lets everything through
    pub fn allow_all(center: Arc<WatchCenter>) -> Self {
        Self::new(center, Arc::new(AllowAll))
    }

    pub fn center(&self) -> &Arc<WatchCenter> {
        &self.center
    }

    fn authorize(
        &self,
        client_id: &str,
        watch_files: &[ClientFileInfo],
    ) -> std::result::Result<(), AuthError> {
        let ctx = WatchAuthContext::new(client_id, watch_files);
        self.checker.check_permission(&ctx).inspect_err(|e| {
            debug!(client_id, error = %e, "Watch request denied");
        })
    }

    /// Checks permission, then registers the long poll
    pub fn long_poll_watch(
        &self,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
        timeout: Option<Duration>,
    ) -> Result<WatchOutcome> {
        if let Err(e) = self.authorize(client_id, &watch_files) {
            return Ok(WatchOutcome::Immediate(ConfigClientResponse::unauthorized(e.to_string())));
        }
        self.center.long_poll_watch(client_id, watch_files, timeout)
    }

    /// Checks permission, then opens a stream subscription
    ///
    /// A denied request gets a subscription that yields one "unauthorized"
    /// response and then ends.
    pub fn subscribe_stream(
        &self,
        client_id: &str,
        watch_files: Vec<ClientFileInfo>,
    ) -> Result<StreamSubscription> {
        if let Err(e) = self.authorize(client_id, &watch_files) {
            return Ok(StreamSubscription::rejected(
                client_id,
                ConfigClientResponse::unauthorized(e.to_string()),
            ));
        }
        self.center.subscribe_stream(client_id, watch_files)
    }
}
