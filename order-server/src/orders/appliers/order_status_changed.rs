//! OrderStatusChanged event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderStatusChanged applier
pub struct OrderStatusChangedApplier;

impl EventApplier for OrderStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderStatusChanged { to, .. } = &event.payload {
            snapshot.status = *to;
            super::touch(snapshot, event);
        }
    }
}
