//! SettlePayment command handler
//!
//! Marks the pending payment settled. From then on every money mutation
//! of the order is rejected (refunds included); gateway settlement
//! itself is outside this core.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::types::PaymentStatus;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::make_event;

/// SettlePayment action
pub struct SettlePaymentAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for SettlePaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        let payment = snapshot.payment.as_ref().ok_or_else(|| {
            OrderError::InvalidOperation(format!("Order {} has no payment record", self.order_id))
        })?;
        if payment.status != PaymentStatus::Pending {
            return Err(OrderError::OrderAlreadyPaid(self.order_id.clone()));
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::PaymentSettled,
            EventPayload::PaymentSettled {
                payment_id: payment.payment_id.clone(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use shared::order::types::PaymentRecord;
    use shared::order::OrderSnapshot;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn order_with_payment(status: PaymentStatus) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.payment = Some(PaymentRecord {
            payment_id: "pay-1".to_string(),
            amount: 500,
            status,
            created_at: 0,
            settled_at: None,
        });
        snapshot
    }

    #[tokio::test]
    async fn test_settle_pending_payment() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &order_with_payment(PaymentStatus::Pending))
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = SettlePaymentAction {
            order_id: "order-1".to_string(),
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events[0].event_type, OrderEventType::PaymentSettled);
    }

    #[tokio::test]
    async fn test_double_settle_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &order_with_payment(PaymentStatus::Settled))
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = SettlePaymentAction {
            order_id: "order-1".to_string(),
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::OrderAlreadyPaid(_))));
    }
}
