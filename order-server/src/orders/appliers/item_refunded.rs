//! ItemRefunded event applier

use crate::orders::traits::EventApplier;
use shared::order::status::ItemStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRefunded applier
pub struct ItemRefundedApplier;

impl EventApplier for ItemRefundedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemRefunded {
            instance_id,
            reason,
            mark_reordered,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(instance_id) {
                item.status = ItemStatus::Refunded;
                item.refunded_at = Some(event.timestamp);
                item.status_reason = reason.clone();
                item.status_actor_id = Some(event.operator_id);
                item.status_actor_name = Some(event.operator_name.clone());
            }
            snapshot.is_refund = true;
            if *mark_reordered {
                snapshot.is_reordered = true;
            }
            super::touch(snapshot, event);
        }
    }
}
