//! AddItems command handler
//!
//! Adds product lines to an existing order with prices frozen from the
//! catalog at add time. An addition after other items have left Created
//! marks the order and the new items as reordered.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing;
use shared::models::{Additive, Product};
use shared::order::types::OrderItemInput;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{build_item_snapshots, ensure_active, ensure_not_settled, make_event};

/// AddItems action
pub struct AddItemsAction {
    pub order_id: String,
    pub items: Vec<OrderItemInput>,
    pub products: HashMap<i64, Product>,
    pub additives: HashMap<i64, Additive>,
}

#[async_trait]
impl CommandHandler for AddItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;
        ensure_not_settled(&snapshot)?;

        if self.items.is_empty() {
            return Err(OrderError::Validation("no items to add".to_string()));
        }

        // Late addition: other items already left Created
        let mark_reordered = snapshot.any_item_in_progress();

        let items =
            build_item_snapshots(&self.items, &self.products, &self.additives, mark_reordered)?;
        let price_delta: i64 = items.iter().map(pricing::item_line_total).sum();

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items,
                mark_reordered,
                price_delta,
            },
        );

        Ok(vec![event])
    }
}
