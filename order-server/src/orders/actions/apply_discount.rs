//! ApplyDiscount command handler
//!
//! The manager resolves the application up front - from the discount
//! store for catalog discounts, or from the loyalty collaborator for a
//! customer's personal discount - and this action computes the amount
//! against the current order. An amount of zero or less is a validation
//! error, not a silent no-op.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::order::types::DiscountApplication;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// ApplyDiscount action
pub struct ApplyDiscountAction {
    pub order_id: String,
    /// Application template with amount still unset
    pub application: DiscountApplication,
}

#[async_trait]
impl CommandHandler for ApplyDiscountAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        let amount =
            pricing::discount_amount(&self.application, snapshot.total, &snapshot.items);
        if amount <= 0 {
            return Err(OrderError::Validation(format!(
                "discount '{}' computes to {} on this order",
                self.application.description, amount
            )));
        }

        let mut application = self.application.clone();
        application.amount = amount;

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::DiscountApplied,
            EventPayload::DiscountApplied { application },
        );

        Ok(vec![event])
    }
}
