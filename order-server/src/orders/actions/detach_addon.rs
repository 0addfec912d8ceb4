//! DetachAddOn command handler

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// DetachAddOn action
pub struct DetachAddOnAction {
    pub order_id: String,
    pub addon_id: i64,
}

#[async_trait]
impl CommandHandler for DetachAddOnAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        let addon = snapshot
            .addons
            .iter()
            .find(|a| a.addon_id == self.addon_id)
            .ok_or(OrderError::AddOnNotFound(self.addon_id))?;

        let mut probe = snapshot.clone();
        probe.addons.retain(|a| a.addon_id != self.addon_id);
        let new_total = pricing::recomputed_total(&probe);
        if new_total < 0 {
            return Err(OrderError::Validation(format!(
                "detaching would make the order total negative ({new_total}); cancel the bonus redemption first"
            )));
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::AddOnDetached,
            EventPayload::AddOnDetached {
                addon_id: self.addon_id,
                name: addon.name.clone(),
                price_delta: new_total - snapshot.total,
            },
        );

        Ok(vec![event])
    }
}
