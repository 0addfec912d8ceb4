//! CancelBonusRedemption command handler
//!
//! Removes the whole redemption from the order; the manager re-credits
//! the points through the loyalty collaborator after commit.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// CancelBonusRedemption action
pub struct CancelBonusRedemptionAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CancelBonusRedemptionAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        if snapshot.bonus_points_used == 0 {
            return Err(OrderError::InvalidOperation(
                "no bonus points redeemed on this order".to_string(),
            ));
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::BonusRedemptionCancelled,
            EventPayload::BonusRedemptionCancelled {
                points: snapshot.bonus_points_used,
            },
        );

        Ok(vec![event])
    }
}
