use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::DashSet;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::EventHub;
use super::Subscription;
use crate::metrics::DROPPED_PUBLISH_EVENTS;
use crate::ConfigFileRelease;
use crate::EventBusError;
use crate::PublishEvent;
use crate::CONFIG_FILE_PUBLISH_TOPIC;

#[derive(Debug)]
struct Subscriber {
    id: u64,
    sender: mpsc::Sender<PublishEvent>,
}

#[derive(Debug, Default)]
struct HubInner {
    /// Subscribers grouped by topic
    topics: DashMap<String, Vec<Subscriber>>,
    /// Topics that refuse new subscribers and events
    closed: DashSet<String>,
    next_id: AtomicU64,
}

/// An emptied topic entry is removed in the same critical section that
/// emptied it, so a concurrent subscribe never lands in a dropped vector.
fn unsubscribe(
    inner: &HubInner,
    topic: &str,
    id: u64,
) {
    inner.topics.remove_if_mut(topic, |_topic, subscribers| {
        subscribers.retain(|s| s.id != id);
        subscribers.is_empty()
    });
    trace!(topic, subscription_id = id, "Subscription cancelled");
}

/// In-process event bus with bounded, non-blocking per-subscriber queues
#[derive(Debug, Clone, Default)]
pub struct LocalEventHub {
    inner: Arc<HubInner>,
}

impl LocalEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `event` to every subscriber of `topic`
    ///
    /// Never blocks. Returns the number of subscribers that accepted the
    /// event; subscribers with a full queue miss it.
    pub fn publish(
        &self,
        topic: &str,
        event: PublishEvent,
    ) -> std::result::Result<usize, EventBusError> {
        if self.inner.closed.contains(topic) {
            return Err(EventBusError::TopicClosed(topic.to_string()));
        }

        let mut delivered = 0;
        let mut departed = Vec::new();

        if let Some(subscribers) = self.inner.topics.get(topic) {
            for subscriber in subscribers.iter() {
                match subscriber.sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        DROPPED_PUBLISH_EVENTS.with_label_values(&[topic]).inc();
                        warn!(
                            topic,
                            subscription_id = subscriber.id,
                            file = %event.release.active_key(),
                            "Subscriber queue full, publish event dropped"
                        );
                    }
                    Err(TrySendError::Closed(_)) => departed.push(subscriber.id),
                }
            }
        }

        for id in departed {
            unsubscribe(&self.inner, topic, id);
        }

        trace!(topic, delivered, "Event published");
        Ok(delivered)
    }

    /// Publishes a config file release on the publish topic
    pub fn publish_release(
        &self,
        release: ConfigFileRelease,
    ) -> std::result::Result<usize, EventBusError> {
        self.publish(CONFIG_FILE_PUBLISH_TOPIC, PublishEvent::new(release))
    }

    /// Closes a topic: subscribers are detached and their queues end once drained
    pub fn close_topic(
        &self,
        topic: &str,
    ) {
        self.inner.closed.insert(topic.to_string());
        if let Some((_, subscribers)) = self.inner.topics.remove(topic) {
            debug!(topic, subscribers = subscribers.len(), "Topic closed");
        }
    }

    pub fn subscriber_count(
        &self,
        topic: &str,
    ) -> usize {
        self.inner.topics.get(topic).map(|s| s.len()).unwrap_or(0)
    }
}

impl EventHub for LocalEventHub {
    fn subscribe(
        &self,
        topic: &str,
        queue_size: usize,
    ) -> std::result::Result<Subscription, EventBusError> {
        if queue_size == 0 {
            return Err(EventBusError::InvalidQueueSize(queue_size));
        }
        if self.inner.closed.contains(topic) {
            return Err(EventBusError::TopicClosed(topic.to_string()));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (sender, receiver) = mpsc::channel(queue_size);

        self.inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { id, sender });

        debug!(topic, subscription_id = id, queue_size, "Subscription opened");

        let inner = Arc::clone(&self.inner);
        let owned_topic = topic.to_string();
        Ok(Subscription::new(id, topic, receiver, move || {
            unsubscribe(&inner, &owned_topic, id)
        }))
    }
}
