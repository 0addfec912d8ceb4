//! ModifyItem command handler
//!
//! Quantity and additive changes are only permitted while the item is
//! still in Created; comments stay editable on any non-cancelled item,
//! including refunded ones. A quantity reduction after the order left
//! Created marks the order as reordered.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::order::status::{ItemStatus, OrderStatus};
use shared::order::types::ItemChanges;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// ModifyItem action; additives in `changes` are already resolved to
/// frozen prices by the manager.
pub struct ModifyItemAction {
    pub order_id: String,
    pub instance_id: String,
    pub changes: ItemChanges,
}

#[async_trait]
impl CommandHandler for ModifyItemAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        let item = snapshot
            .find_item(&self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;

        let changes_money = self.changes.quantity.is_some() || self.changes.additives.is_some();
        if changes_money && item.status != ItemStatus::Created {
            return Err(OrderError::ItemNotEditable(format!(
                "item {} is {:?}; only the comment can change",
                self.instance_id, item.status
            )));
        }
        if self.changes.comment.is_some() && item.status == ItemStatus::Cancelled {
            return Err(OrderError::ItemNotEditable(format!(
                "item {} is cancelled",
                self.instance_id
            )));
        }
        if let Some(quantity) = self.changes.quantity
            && quantity < 1
        {
            return Err(OrderError::Validation(
                "quantity must be at least 1; remove the item instead".to_string(),
            ));
        }
        if self.changes == ItemChanges::default() {
            return Err(OrderError::Validation("no changes given".to_string()));
        }

        let previous = ItemChanges {
            quantity: self.changes.quantity.map(|_| item.quantity),
            comment: self.changes.comment.as_ref().and(item.comment.clone()),
            additives: self.changes.additives.as_ref().map(|_| item.additives.clone()),
        };

        // Validate the prospective total (a reduction must not push a
        // bonus-redeemed order negative) and compute the exact delta.
        let mut probe = snapshot.clone();
        if let Some(probe_item) = probe.find_item_mut(&self.instance_id) {
            if let Some(quantity) = self.changes.quantity {
                probe_item.quantity = quantity;
            }
            if let Some(additives) = &self.changes.additives {
                probe_item.additives = additives.clone();
            }
        }
        let new_total = pricing::recomputed_total(&probe);
        if new_total < 0 {
            return Err(OrderError::Validation(format!(
                "change would make the order total negative ({new_total}); cancel the bonus redemption first"
            )));
        }
        let price_delta = new_total - snapshot.total;

        let quantity_reduced = self
            .changes
            .quantity
            .is_some_and(|q| q < item.quantity);
        let mark_reordered = quantity_reduced && snapshot.status != OrderStatus::Created;

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::ItemModified,
            EventPayload::ItemModified {
                instance_id: self.instance_id.clone(),
                changes: self.changes.clone(),
                previous,
                mark_reordered,
                price_delta,
            },
        );

        Ok(vec![event])
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
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn order_with_item(status: ItemStatus) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        let mut item = OrderItemSnapshot::new("inst-1".into(), 1, "Soup".into(), 300, 2);
        item.status = status;
        snapshot.items.push(item);
        crate::pricing::recalculate_totals(&mut snapshot);
        snapshot
    }

    fn store(storage: &OrderStorage, snapshot: &OrderSnapshot) {
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, snapshot).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_quantity_change_computes_delta() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_item(ItemStatus::Created));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "inst-1".to_string(),
            changes: ItemChanges { quantity: Some(3), ..Default::default() },
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();

        if let EventPayload::ItemModified { price_delta, previous, .. } = &events[0].payload {
            assert_eq!(*price_delta, 300);
            assert_eq!(previous.quantity, Some(2));
        } else {
            panic!("Expected ItemModified payload");
        }
    }

    #[tokio::test]
    async fn test_quantity_change_rejected_once_in_progress() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_item(ItemStatus::InProgress));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "inst-1".to_string(),
            changes: ItemChanges { quantity: Some(1), ..Default::default() },
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::ItemNotEditable(_))));
    }

    #[tokio::test]
    async fn test_comment_editable_on_refunded_item() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_item(ItemStatus::Refunded));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "inst-1".to_string(),
            changes: ItemChanges {
                comment: Some("refund note".to_string()),
                ..Default::default()
            },
        };
        assert!(action.execute(&mut ctx, &metadata()).await.is_ok());
    }

    #[tokio::test]
    async fn test_quantity_reduction_after_confirmation_marks_reordered() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = order_with_item(ItemStatus::Created);
        snapshot.status = OrderStatus::Confirmed;
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "inst-1".to_string(),
            changes: ItemChanges { quantity: Some(1), ..Default::default() },
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        if let EventPayload::ItemModified { mark_reordered, .. } = &events[0].payload {
            assert!(mark_reordered);
        } else {
            panic!("Expected ItemModified payload");
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store(&storage, &order_with_item(ItemStatus::Created));

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "inst-1".to_string(),
            changes: ItemChanges { quantity: Some(0), ..Default::default() },
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }
}
