//! DiscountRemoved event applier
//!
//! Removes one matching application per event (actions emit one event
//! per linked application) and marks the order's discount-canceled flag.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// DiscountRemoved applier
pub struct DiscountRemovedApplier;

impl EventApplier for DiscountRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::DiscountRemoved { discount_id, .. } = &event.payload {
            if let Some(position) = snapshot
                .discounts
                .iter()
                .position(|d| d.discount_id == *discount_id)
            {
                snapshot.discounts.remove(position);
            }
            snapshot.discount_canceled = true;
            super::touch(snapshot, event);
        }
    }
}
