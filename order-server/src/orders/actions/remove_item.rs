//! RemoveItem command handler
//!
//! Items are not physically deleted: removal marks the item cancelled so
//! the audit trail survives, and the totals drop it from that point on.
//! Completed items cannot be removed; they go through the refund path.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::order::status::{ItemStatus, OrderStatus};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, ensure_not_settled, make_event};

/// RemoveItem action
pub struct RemoveItemAction {
    pub order_id: String,
    pub instance_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for RemoveItemAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        let item = snapshot
            .find_item(&self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;
        if item.status.is_terminal() {
            return Err(OrderError::ItemNotEditable(format!(
                "item {} is {:?} and cannot be removed",
                self.instance_id, item.status
            )));
        }

        let mut probe = snapshot.clone();
        if let Some(probe_item) = probe.find_item_mut(&self.instance_id) {
            probe_item.status = ItemStatus::Cancelled;
        }
        let new_total = pricing::recomputed_total(&probe);
        if new_total < 0 {
            return Err(OrderError::Validation(format!(
                "removal would make the order total negative ({new_total}); cancel the bonus redemption first"
            )));
        }
        let price_delta = new_total - snapshot.total;
        let mark_reordered = snapshot.status != OrderStatus::Created;

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::ItemRemoved,
            EventPayload::ItemRemoved {
                instance_id: self.instance_id.clone(),
                item_name: item.name.clone(),
                reason: self.reason.clone(),
                mark_reordered,
                price_delta,
            },
        );

        Ok(vec![event])
    }
}
