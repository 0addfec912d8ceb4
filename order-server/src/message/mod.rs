//! Post-commit notification fan-out
//!
//! ```text
//! OrdersManager (broadcast, post-commit)
//!        │
//!        └── run_event_fanout
//!               ├── topic restaurant:{id} ──► subscribers
//!               └── topic order:{id}      ──► subscribers
//! ```
//!
//! Dispatch runs strictly after commit with no artificial delay; a
//! failure to deliver is logged and never reaches the caller.

pub mod dispatcher;

pub use dispatcher::{
    order_topic, restaurant_topic, Notification, NotificationDispatcher, NotificationKind,
    Subscription,
};

use std::sync::Arc;
use tokio::sync::broadcast;

use shared::order::{OrderEvent, OrderEventType};

/// Map an order event to the notification kind subscribers see
fn kind_for(event_type: OrderEventType) -> NotificationKind {
    match event_type {
        OrderEventType::OrderCreated => NotificationKind::NewOrder,
        OrderEventType::OrderStatusChanged => NotificationKind::OrderStatusChanged,
        OrderEventType::ItemsAdded
        | OrderEventType::ItemModified
        | OrderEventType::ItemRemoved
        | OrderEventType::ItemRefunded
        | OrderEventType::ItemStatusChanged => NotificationKind::ItemChanged,
        OrderEventType::OrderInfoUpdated
        | OrderEventType::TableAssigned
        | OrderEventType::TableReleased
        | OrderEventType::AddOnAttached
        | OrderEventType::AddOnDetached
        | OrderEventType::DiscountApplied
        | OrderEventType::DiscountRemoved
        | OrderEventType::BonusRedeemed
        | OrderEventType::BonusRedemptionCancelled
        | OrderEventType::PaymentSettled => NotificationKind::OrderModified,
    }
}

/// Forward committed events to the restaurant and order topics until the
/// source channel closes.
pub async fn run_event_fanout(
    dispatcher: Arc<NotificationDispatcher>,
    mut source: broadcast::Receiver<OrderEvent>,
) {
    tracing::info!("Notification fan-out started");
    loop {
        match source.recv().await {
            Ok(event) => {
                let kind = kind_for(event.event_type);
                let payload = match serde_json::to_value(&event) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(error = %e, order_id = %event.order_id, "Failed to serialize event for notification");
                        continue;
                    }
                };
                dispatcher.publish(
                    &restaurant_topic(event.restaurant_id),
                    kind,
                    &event.order_id,
                    payload.clone(),
                    event.timestamp,
                );
                dispatcher.publish(
                    &order_topic(&event.order_id),
                    kind,
                    &event.order_id,
                    payload,
                    event.timestamp,
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification fan-out lagged, events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Source channel closed, notification fan-out stopping");
                break;
            }
        }
    }
}
