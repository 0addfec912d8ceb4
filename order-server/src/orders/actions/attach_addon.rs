//! AttachAddOn command handler
//!
//! Attaches a reusable order-level add-on with its unit price frozen at
//! attach time. PerItem/PerPerson contributions are re-derived from the
//! order's current item count / party size whenever totals recalculate.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::models::OrderAddOnDef;
use shared::order::types::AddOnAttachment;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// AttachAddOn action; the definition is resolved by the manager.
pub struct AttachAddOnAction {
    pub order_id: String,
    pub quantity: i32,
    pub def: OrderAddOnDef,
}

#[async_trait]
impl CommandHandler for AttachAddOnAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        if self.quantity < 1 {
            return Err(OrderError::Validation(
                "add-on quantity must be at least 1".to_string(),
            ));
        }
        if snapshot.addons.iter().any(|a| a.addon_id == self.def.id) {
            return Err(OrderError::InvalidOperation(format!(
                "add-on {} is already attached; adjust its quantity instead",
                self.def.id
            )));
        }

        let mut addon = AddOnAttachment {
            addon_id: self.def.id,
            name: self.def.name.clone(),
            mode: self.def.mode,
            unit_price: self.def.price,
            quantity: self.quantity,
            amount: 0,
        };
        addon.amount = pricing::addon_amount(
            &addon,
            pricing::countable_quantity(&snapshot.items),
            snapshot.guest_count,
        );

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::AddOnAttached,
            EventPayload::AddOnAttached { addon },
        );

        Ok(vec![event])
    }
}
