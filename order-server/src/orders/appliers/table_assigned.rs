//! TableAssigned event applier
//!
//! Assigning a table forces the order type to dine-in.

use crate::orders::traits::EventApplier;
use shared::order::types::OrderType;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableAssigned applier
pub struct TableAssignedApplier;

impl EventApplier for TableAssignedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableAssigned {
            table_id,
            table_name,
            ..
        } = &event.payload
        {
            snapshot.table_id = Some(*table_id);
            snapshot.table_name = Some(table_name.clone());
            snapshot.order_type = OrderType::DineIn;
            super::touch(snapshot, event);
        }
    }
}
