//! UpdateOrderStatus command handler
//!
//! Validates the explicit order-level transition against the lookup
//! table (Delivering only exists for delivery orders, cancellation only
//! before Ready). Reaching a terminal status releases a held table.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::tables;
use shared::order::status::OrderStatus;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::make_event;

/// UpdateOrderStatus action
pub struct UpdateOrderStatusAction {
    pub order_id: String,
    pub status: OrderStatus,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for UpdateOrderStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        if !snapshot
            .status
            .can_transition(self.status, snapshot.order_type)
        {
            return Err(OrderError::InvalidOrderTransition {
                from: snapshot.status,
                to: self.status,
            });
        }

        let mut events = Vec::with_capacity(2);
        let seq = ctx.next_sequence();
        events.push(make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::OrderStatusChanged,
            EventPayload::OrderStatusChanged {
                from: snapshot.status,
                to: self.status,
                reason: self.reason.clone(),
            },
        ));

        // A terminal order frees its table unless another active order
        // still references it.
        if self.status.is_terminal()
            && let Some(table_id) = snapshot.table_id
        {
            tables::release(ctx.storage(), ctx.txn(), table_id, &self.order_id)?;
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::TableReleased,
                EventPayload::TableReleased { table_id },
            ));
        }

        Ok(events)
    }
}
