//! RedeemBonusPoints command handler
//!
//! Points convert 1:1 to minor currency units. The manager has already
//! spent the points through the loyalty collaborator (which enforces the
//! balance) before the transaction; if this action then fails, the
//! manager issues a compensating credit.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// RedeemBonusPoints action
pub struct RedeemBonusAction {
    pub order_id: String,
    pub points: i64,
    /// Balance after the spend, reported by the loyalty collaborator
    pub new_balance: i64,
}

#[async_trait]
impl CommandHandler for RedeemBonusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        if self.points < 1 {
            return Err(OrderError::Validation(
                "points must be at least 1".to_string(),
            ));
        }
        if snapshot.customer_id.is_none() {
            return Err(OrderError::Validation(
                "order has no customer to redeem points for".to_string(),
            ));
        }
        if snapshot.total - self.points < 0 {
            return Err(OrderError::Validation(format!(
                "redeeming {} points would make the order total negative",
                self.points
            )));
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::BonusRedeemed,
            EventPayload::BonusRedeemed {
                points: self.points,
                new_balance: self.new_balance,
            },
        );

        Ok(vec![event])
    }
}
