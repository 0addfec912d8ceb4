//! OrderInfoUpdated event applier
//!
//! A guest-count change reprices PerPerson add-ons via the shared
//! recalculation.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderInfoUpdated applier
pub struct OrderInfoUpdatedApplier;

impl EventApplier for OrderInfoUpdatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderInfoUpdated {
            guest_count,
            is_precheck,
        } = &event.payload
        {
            if let Some(guest_count) = guest_count {
                snapshot.guest_count = *guest_count;
            }
            if let Some(is_precheck) = is_precheck {
                snapshot.is_precheck = *is_precheck;
            }
            super::touch(snapshot, event);
        }
    }
}
