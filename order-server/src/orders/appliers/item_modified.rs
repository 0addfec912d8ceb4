//! ItemModified event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemModified applier
pub struct ItemModifiedApplier;

impl EventApplier for ItemModifiedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemModified {
            instance_id,
            changes,
            mark_reordered,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(instance_id) {
                if let Some(quantity) = changes.quantity {
                    item.quantity = quantity;
                }
                if let Some(comment) = &changes.comment {
                    item.comment = Some(comment.clone());
                }
                if let Some(additives) = &changes.additives {
                    item.additives = additives.clone();
                }
            }
            if *mark_reordered {
                snapshot.is_reordered = true;
            }
            super::touch(snapshot, event);
        }
    }
}
