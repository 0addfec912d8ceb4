//! RefundItem command handler
//!
//! Refund is an explicit operator action outside the forward status
//! chain: any non-terminal or completed item is refundable, cancelled or
//! already-refunded items are not. The refunded amount leaves the order
//! total and the pending payment.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::order::status::{ItemStatus, OrderStatus};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_not_settled, make_event};

/// RefundItem action
pub struct RefundItemAction {
    pub order_id: String,
    pub instance_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for RefundItemAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_not_settled(&snapshot)?;

        let item = snapshot
            .find_item(&self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;
        if !item.status.can_refund() {
            return Err(OrderError::ItemNotEditable(format!(
                "item {} is {:?} and cannot be refunded",
                self.instance_id, item.status
            )));
        }

        let refund_amount = pricing::item_line_total(item);

        let mut probe = snapshot.clone();
        if let Some(probe_item) = probe.find_item_mut(&self.instance_id) {
            probe_item.status = ItemStatus::Refunded;
        }
        let new_total = pricing::recomputed_total(&probe);
        if new_total < 0 {
            return Err(OrderError::Validation(format!(
                "refund would make the order total negative ({new_total}); cancel the bonus redemption first"
            )));
        }

        let mark_reordered = snapshot.status != OrderStatus::Created;

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::ItemRefunded,
            EventPayload::ItemRefunded {
                instance_id: self.instance_id.clone(),
                item_name: item.name.clone(),
                reason: self.reason.clone(),
                mark_reordered,
                refund_amount,
            },
        );

        Ok(vec![event])
    }
}
