//! ItemsAdded event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemsAdded {
            items,
            mark_reordered,
            ..
        } = &event.payload
        {
            snapshot.items.extend(items.iter().cloned());
            if *mark_reordered {
                snapshot.is_reordered = true;
            }
            super::touch(snapshot, event);
        }
    }
}
