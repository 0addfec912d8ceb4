//! UpdateOrderInfo command handler
//!
//! Guest-count changes re-price PerPerson add-ons through the usual
//! recalculation; the precheck flag marks that a pre-bill was printed.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, make_event};

/// UpdateOrderInfo action
pub struct UpdateOrderInfoAction {
    pub order_id: String,
    pub guest_count: Option<i32>,
    pub is_precheck: Option<bool>,
}

#[async_trait]
impl CommandHandler for UpdateOrderInfoAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;

        if self.guest_count.is_none() && self.is_precheck.is_none() {
            return Err(OrderError::Validation("no changes given".to_string()));
        }
        if let Some(guest_count) = self.guest_count
            && guest_count < 1
        {
            return Err(OrderError::Validation(
                "guest count must be at least 1".to_string(),
            ));
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::OrderInfoUpdated,
            EventPayload::OrderInfoUpdated {
                guest_count: self.guest_count,
                is_precheck: self.is_precheck,
            },
        );

        Ok(vec![event])
    }
}
