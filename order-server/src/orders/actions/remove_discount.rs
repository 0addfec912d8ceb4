//! RemoveDiscount command handler
//!
//! Removes every application linked to the discount and restores their
//! exact amounts; the manager decrements the source discount's usage
//! counter once per removed application after commit.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// RemoveDiscount action; `discount_id = None` targets the personal
/// discount application.
pub struct RemoveDiscountAction {
    pub order_id: String,
    pub discount_id: Option<i64>,
}

#[async_trait]
impl CommandHandler for RemoveDiscountAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        let matching: Vec<_> = snapshot
            .discounts
            .iter()
            .filter(|d| d.discount_id == self.discount_id)
            .collect();
        if matching.is_empty() {
            return match self.discount_id {
                Some(id) => Err(OrderError::DiscountNotFound(id)),
                None => Err(OrderError::InvalidOperation(
                    "no personal discount applied to this order".to_string(),
                )),
            };
        }

        let mut events = Vec::with_capacity(matching.len());
        for application in matching {
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::DiscountRemoved,
                EventPayload::DiscountRemoved {
                    discount_id: application.discount_id,
                    description: application.description.clone(),
                    amount: application.amount,
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
    use rust_decimal::Decimal;
    use shared::models::{DiscountKind, DiscountTarget};
    use shared::order::types::DiscountApplication;
    use shared::order::OrderSnapshot;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn application(discount_id: Option<i64>, amount: i64) -> DiscountApplication {
        DiscountApplication {
            discount_id,
            description: "Promo".to_string(),
            kind: DiscountKind::Fixed,
            value: Decimal::from(amount),
            target: DiscountTarget::All,
            amount,
        }
    }

    #[tokio::test]
    async fn test_remove_emits_one_event_per_application() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.discounts.push(application(Some(1), 100));
        snapshot.discounts.push(application(Some(1), 50));
        snapshot.discounts.push(application(Some(2), 30));
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = RemoveDiscountAction {
            order_id: "order-1".to_string(),
            discount_id: Some(1),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 2);
        let restored: i64 = events
            .iter()
            .map(|e| match &e.payload {
                EventPayload::DiscountRemoved { amount, .. } => *amount,
                _ => panic!("Expected DiscountRemoved payload"),
            })
            .sum();
        assert_eq!(restored, 150);
    }

    #[tokio::test]
    async fn test_remove_unknown_discount() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &OrderSnapshot::new("order-1".to_string()))
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = RemoveDiscountAction {
            order_id: "order-1".to_string(),
            discount_id: Some(9),
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::DiscountNotFound(9))));
    }
}
