//! UpdateItemStatus command handler (bulk)
//!
//! Membership of every instance id is validated before anything is
//! emitted: one unknown id rejects the whole batch with the full list of
//! offenders. After the item events, the derived order status is
//! recomputed and an OrderStatusChanged event is appended if it moved.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::status::{derive_order_status, ItemStatus};
use shared::order::types::ItemStatusUpdate;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, make_event};

/// UpdateItemStatus action
pub struct UpdateItemStatusAction {
    pub order_id: String,
    pub updates: Vec<ItemStatusUpdate>,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for UpdateItemStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;

        if self.updates.is_empty() {
            return Err(OrderError::Validation("no status updates given".to_string()));
        }

        // All-or-nothing membership validation before any event is built
        let unknown: Vec<&str> = self
            .updates
            .iter()
            .filter(|u| snapshot.find_item(&u.instance_id).is_none())
            .map(|u| u.instance_id.as_str())
            .collect();
        if !unknown.is_empty() {
            return Err(OrderError::ItemNotFound(unknown.join(", ")));
        }

        // Validate transitions sequentially so duplicated ids within one
        // batch see the effect of earlier entries.
        let mut current: HashMap<&str, ItemStatus> = snapshot
            .items
            .iter()
            .map(|i| (i.instance_id.as_str(), i.status))
            .collect();
        let mut events = Vec::with_capacity(self.updates.len());
        let mut probe_items = snapshot.items.clone();

        for update in &self.updates {
            let from = current[update.instance_id.as_str()];
            if !from.can_transition(update.status) {
                return Err(OrderError::InvalidItemTransition {
                    from,
                    to: update.status,
                });
            }
            current.insert(update.instance_id.as_str(), update.status);
            if let Some(item) = probe_items
                .iter_mut()
                .find(|i| i.instance_id == update.instance_id)
            {
                item.status = update.status;
            }

            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::ItemStatusChanged,
                EventPayload::ItemStatusChanged {
                    instance_id: update.instance_id.clone(),
                    from,
                    to: update.status,
                    reason: self.reason.clone(),
                },
            ));
        }

        // Recompute the derived order status against the prospective items
        let derived = derive_order_status(&probe_items, snapshot.status);
        if derived != snapshot.status {
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::OrderStatusChanged,
                EventPayload::OrderStatusChanged {
                    from: snapshot.status,
                    to: derived,
                    reason: None,
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
    use shared::order::status::OrderStatus;
    use shared::order::types::OrderItemSnapshot;
    use shared::order::OrderSnapshot;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn order_with_items(statuses: &[(&str, ItemStatus)]) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Confirmed;
        for (instance_id, status) in statuses {
            let mut item =
                OrderItemSnapshot::new(instance_id.to_string(), 1, "Dish".into(), 500, 1);
            item.status = *status;
            snapshot.items.push(item);
        }
        snapshot
    }

    fn store(storage: &OrderStorage, snapshot: &OrderSnapshot) {
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, snapshot).unwrap();
        txn.commit().unwrap();
    }

    fn update(instance_id: &str, status: ItemStatus) -> ItemStatusUpdate {
        ItemStatusUpdate {
            instance_id: instance_id.to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_bulk_update_emits_per_item_and_derivation() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(
            &storage,
            &order_with_items(&[("a", ItemStatus::Created), ("b", ItemStatus::Created)]),
        );

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            updates: vec![
                update("a", ItemStatus::InProgress),
                update("b", ItemStatus::InProgress),
            ],
            reason: None,
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();

        // Two item events plus the derived Preparing transition
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].event_type, OrderEventType::OrderStatusChanged);
        if let EventPayload::OrderStatusChanged { to, .. } = &events[2].payload {
            assert_eq!(*to, OrderStatus::Preparing);
        } else {
            panic!("Expected OrderStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_all_completed_derives_ready() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(
            &storage,
            &order_with_items(&[("a", ItemStatus::InProgress), ("b", ItemStatus::Completed)]),
        );

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            updates: vec![update("a", ItemStatus::Completed)],
            reason: None,
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        if let EventPayload::OrderStatusChanged { to, .. } = &events.last().unwrap().payload {
            assert_eq!(*to, OrderStatus::Ready);
        } else {
            panic!("Expected OrderStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_one_unknown_id_rejects_entire_batch() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_items(&[("a", ItemStatus::Created)]));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            updates: vec![
                update("a", ItemStatus::InProgress),
                update("ghost-1", ItemStatus::InProgress),
                update("ghost-2", ItemStatus::InProgress),
            ],
            reason: None,
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        match result {
            Err(OrderError::ItemNotFound(ids)) => {
                assert!(ids.contains("ghost-1"));
                assert!(ids.contains("ghost-2"));
            }
            other => panic!("Expected ItemNotFound with offender list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_items(&[("a", ItemStatus::Completed)]));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            updates: vec![update("a", ItemStatus::InProgress)],
            reason: None,
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(
            result,
            Err(OrderError::InvalidItemTransition {
                from: ItemStatus::Completed,
                to: ItemStatus::InProgress
            })
        ));
    }

    #[tokio::test]
    async fn test_refunded_not_reachable_via_bulk_update() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_items(&[("a", ItemStatus::InProgress)]));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            updates: vec![update("a", ItemStatus::Refunded)],
            reason: None,
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::InvalidItemTransition { .. })));
    }
}
