//! StartScheduledOrder command handler
//!
//! Time-driven transition issued by the scheduled-order worker: a
//! confirmed order whose scheduled time has come moves to Preparing and
//! its still-created items to InProgress. Re-running against an
//! already-started order is a no-op (empty event list), which makes the
//! worker safe to re-fire and to race user-driven changes.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::status::{ItemStatus, OrderStatus};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::make_event;

/// StartScheduledOrder action
pub struct StartScheduledOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for StartScheduledOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        if snapshot.scheduled_for.is_none() {
            return Err(OrderError::InvalidOperation(format!(
                "Order {} is not scheduled",
                self.order_id
            )));
        }

        let mut events = Vec::new();

        // Only a confirmed order is started; anything else means the
        // order either was not confirmed yet or has already progressed.
        if snapshot.status == OrderStatus::Confirmed {
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::OrderStatusChanged,
                EventPayload::OrderStatusChanged {
                    from: snapshot.status,
                    to: OrderStatus::Preparing,
                    reason: Some("scheduled start".to_string()),
                },
            ));
        } else if snapshot.status != OrderStatus::Preparing {
            return Ok(vec![]);
        }

        for item in snapshot
            .items
            .iter()
            .filter(|i| i.status == ItemStatus::Created)
        {
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::ItemStatusChanged,
                EventPayload::ItemStatusChanged {
                    instance_id: item.instance_id.clone(),
                    from: ItemStatus::Created,
                    to: ItemStatus::InProgress,
                    reason: Some("scheduled start".to_string()),
                },
            ));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use shared::order::types::OrderItemSnapshot;
    use shared::order::OrderSnapshot;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 0,
            operator_name: "scheduler".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn scheduled_order(status: OrderStatus) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = status;
        snapshot.scheduled_for = Some(1_700_000_000_000);
        snapshot
            .items
            .push(OrderItemSnapshot::new("inst-1".into(), 1, "Cake".into(), 900, 1));
        snapshot
    }

    fn store(storage: &OrderStorage, snapshot: &OrderSnapshot) {
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, snapshot).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_start_confirmed_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &scheduled_order(OrderStatus::Confirmed));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = StartScheduledOrderAction {
            order_id: "order-1".to_string(),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, OrderEventType::OrderStatusChanged);
        assert_eq!(events[1].event_type, OrderEventType::ItemStatusChanged);
    }

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = scheduled_order(OrderStatus::Preparing);
        snapshot.items[0].status = ItemStatus::InProgress;
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = StartScheduledOrderAction {
            order_id: "order-1".to_string(),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_unconfirmed_order_is_noop() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &scheduled_order(OrderStatus::Created));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = StartScheduledOrderAction {
            order_id: "order-1".to_string(),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_unscheduled_order_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = scheduled_order(OrderStatus::Confirmed);
        snapshot.scheduled_for = None;
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = StartScheduledOrderAction {
            order_id: "order-1".to_string(),
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_preparing_with_created_items_catches_up() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &scheduled_order(OrderStatus::Preparing));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = StartScheduledOrderAction {
            order_id: "order-1".to_string(),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, OrderEventType::ItemStatusChanged);
    }
}
