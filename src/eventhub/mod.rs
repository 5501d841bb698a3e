//! Event bus abstraction delivering "config file republished" events
//!
//! The publishing pipeline lives outside this crate. The watch center only
//! subscribes to [`CONFIG_FILE_PUBLISH_TOPIC`](crate::CONFIG_FILE_PUBLISH_TOPIC)
//! with a bounded queue and consumes [`PublishEvent`]s from it.
//!
//! [`LocalEventHub`] is an in-process implementation: each subscriber owns a
//! bounded tokio mpsc queue and publishers never block. When a subscriber
//! queue is full the event is dropped for that subscriber only.

mod local;
pub use local::*;


use tokio::sync::mpsc;

use crate::EventBusError;
use crate::PublishEvent;

pub trait EventHub: Send + Sync + 'static {
    /// Opens a subscription holding at most `queue_size` pending events
    fn subscribe(
        &self,
        topic: &str,
        queue_size: usize,
    ) -> std::result::Result<Subscription, EventBusError>;
}

type Canceller = Box<dyn FnOnce() + Send + Sync>;

/// Receiving side of one topic subscription
///
/// Dropping the subscription cancels it.
pub struct Subscription {
    id: u64,
    topic: String,
    receiver: mpsc::Receiver<PublishEvent>,
    canceller: Option<Canceller>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("cancelled", &self.canceller.is_none())
            .finish()
    }
}

impl Subscription {
    /// Builds a subscription whose `canceller` detaches it from the bus
    pub fn new(
        id: u64,
        topic: impl Into<String>,
        receiver: mpsc::Receiver<PublishEvent>,
        canceller: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            receiver,
            canceller: Some(Box::new(canceller)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next event; `None` once the bus side has gone away
    pub async fn recv(&mut self) -> Option<PublishEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<PublishEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.canceller.is_none()
    }

    /// Detaches from the bus. Events already queued can still be drained.
    pub fn cancel(&mut self) -> std::result::Result<(), EventBusError> {
        match self.canceller.take() {
            Some(canceller) => {
                canceller();
                Ok(())
            }
            None => Err(EventBusError::AlreadyCancelled {
                topic: self.topic.clone(),
                id: self.id,
            }),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(canceller) = self.canceller.take() {
            canceller();
        }
    }
}
