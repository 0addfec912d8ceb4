//! Notification dispatcher with an explicit subscription registry
//!
//! Subscriptions are keyed by topic (`restaurant:{id}` and
//! `order:{id}`), added and removed through the registry rather than
//! ambient global state. Delivery is at-most-once and best-effort:
//! a full or closed subscriber channel drops the notification with a
//! warning and never affects the committed mutation.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Per-subscriber channel capacity
const SUBSCRIBER_BUFFER: usize = 256;

/// Notification kinds fanned out to subscribers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewOrder,
    OrderStatusChanged,
    ItemChanged,
    OrderModified,
}

/// Post-commit notification envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub kind: NotificationKind,
    pub order_id: String,
    pub payload: serde_json::Value,
    /// Commit timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Topic name for a restaurant's notifications
pub fn restaurant_topic(restaurant_id: i64) -> String {
    format!("restaurant:{restaurant_id}")
}

/// Topic name for a single order's notifications
pub fn order_topic(order_id: &str) -> String {
    format!("order:{order_id}")
}

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Notification>,
}

/// Handle returned from [`NotificationDispatcher::subscribe`]
pub struct Subscription {
    pub id: u64,
    pub topic: String,
    pub rx: mpsc::Receiver<Notification>,
}

/// Topic-keyed subscription registry with thread-safe add/remove
#[derive(Default)]
pub struct NotificationDispatcher {
    topics: DashMap<String, Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for one topic
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription {
        let topic = topic.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.topics
            .entry(topic.clone())
            .or_default()
            .push(Subscriber { id, tx });
        Subscription { id, topic, rx }
    }

    /// Remove a subscriber; dropping the topic entry when it empties
    pub fn unsubscribe(&self, topic: &str, id: u64) {
        if let Some(mut subscribers) = self.topics.get_mut(topic) {
            subscribers.retain(|s| s.id != id);
        }
        self.topics.remove_if(topic, |_, subscribers| subscribers.is_empty());
    }

    /// Number of live subscribers on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map(|s| s.len()).unwrap_or(0)
    }

    /// Publish to every subscriber of the topic, best-effort.
    ///
    /// Closed subscribers are pruned; a full channel drops this
    /// notification for that subscriber only.
    pub fn publish(
        &self,
        topic: &str,
        kind: NotificationKind,
        order_id: &str,
        payload: serde_json::Value,
        timestamp: i64,
    ) {
        let Some(mut subscribers) = self.topics.get_mut(topic) else {
            return;
        };
        subscribers.retain(|subscriber| {
            let notification = Notification {
                topic: topic.to_string(),
                kind,
                order_id: order_id.to_string(),
                payload: payload.clone(),
                timestamp,
            };
            match subscriber.tx.try_send(notification) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(topic, order_id, subscriber = subscriber.id, "Subscriber channel full, notification dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}
