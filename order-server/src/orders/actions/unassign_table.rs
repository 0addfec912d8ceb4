//! UnassignTable command handler

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::tables;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, make_event};

/// UnassignTable action
pub struct UnassignTableAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for UnassignTableAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;

        let table_id = snapshot.table_id.ok_or_else(|| {
            OrderError::InvalidOperation(format!("Order {} holds no table", self.order_id))
        })?;

        tables::release(ctx.storage(), ctx.txn(), table_id, &self.order_id)?;

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::TableReleased,
            EventPayload::TableReleased { table_id },
        );

        Ok(vec![event])
    }
}
