//! Scheduled-order worker
//!
//! Scans active orders on a fixed interval and starts confirmed
//! scheduled orders whose time is within one hour: the order moves to
//! Preparing and its still-created items to InProgress. The worker
//! issues ordinary StartScheduledOrder commands, so it serializes with
//! user-driven mutations at the storage layer and re-firing against an
//! already-started order is a no-op.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::manager::OrdersManager;
use shared::order::status::OrderStatus;
use shared::order::{OrderCommand, OrderCommandPayload};

/// Lead time before the scheduled moment at which preparation starts
const START_LEAD_MS: i64 = 60 * 60 * 1000;

/// System operator identity stamped on worker-issued commands
const SCHEDULER_OPERATOR_ID: i64 = 0;
const SCHEDULER_OPERATOR_NAME: &str = "scheduler";

/// Scheduled-order worker
pub struct ScheduledOrderWorker {
    manager: Arc<OrdersManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ScheduledOrderWorker {
    pub fn new(manager: Arc<OrdersManager>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            manager,
            interval,
            shutdown,
        }
    }

    /// Main loop: tick every interval until shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Scheduled-order worker started");
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Scheduled-order worker received shutdown signal");
                    return;
                }
            }
        }
    }

    /// One scan over the active orders
    fn tick(&self) {
        let orders = match self.manager.get_active_orders() {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Scheduled-order scan failed to list active orders");
                return;
            }
        };

        let now = shared::util::now_millis();
        for order in orders {
            if !Self::is_due(&order.status, order.scheduled_for, now) {
                continue;
            }
            tracing::info!(
                order_id = %order.order_id,
                scheduled_for = ?order.scheduled_for,
                "Starting scheduled order"
            );
            let cmd = OrderCommand::new(
                SCHEDULER_OPERATOR_ID,
                SCHEDULER_OPERATOR_NAME,
                OrderCommandPayload::StartScheduledOrder {
                    order_id: order.order_id.clone(),
                },
            );
            let response = self.manager.execute_command(cmd);
            if !response.success {
                tracing::warn!(
                    order_id = %order.order_id,
                    error = ?response.error,
                    "Scheduled start rejected"
                );
            }
        }
    }

    /// A confirmed order is due once its scheduled time is within the
    /// lead window (or already past)
    fn is_due(status: &OrderStatus, scheduled_for: Option<i64>, now: i64) -> bool {
        matches!(status, OrderStatus::Confirmed)
            && scheduled_for.is_some_and(|at| at - now <= START_LEAD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_due_window() {
        let now = 10_000_000;
        // Inside the one-hour window
        assert!(ScheduledOrderWorker::is_due(
            &OrderStatus::Confirmed,
            Some(now + START_LEAD_MS - 1),
            now
        ));
        // Already past the scheduled time
        assert!(ScheduledOrderWorker::is_due(
            &OrderStatus::Confirmed,
            Some(now - 1),
            now
        ));
        // Too far in the future
        assert!(!ScheduledOrderWorker::is_due(
            &OrderStatus::Confirmed,
            Some(now + START_LEAD_MS + 1),
            now
        ));
        // Not confirmed yet
        assert!(!ScheduledOrderWorker::is_due(
            &OrderStatus::Created,
            Some(now),
            now
        ));
        // Already preparing
        assert!(!ScheduledOrderWorker::is_due(
            &OrderStatus::Preparing,
            Some(now),
            now
        ));
        // Not a scheduled order
        assert!(!ScheduledOrderWorker::is_due(&OrderStatus::Confirmed, None, now));
    }
}
