//! ItemRemoved event applier
//!
//! Removal marks the item cancelled instead of deleting it, keeping the
//! audit trail while the totals drop the line.

use crate::orders::traits::EventApplier;
use shared::order::status::ItemStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRemoved applier
pub struct ItemRemovedApplier;

impl EventApplier for ItemRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemRemoved {
            instance_id,
            reason,
            mark_reordered,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(instance_id) {
                item.status = ItemStatus::Cancelled;
                item.cancelled_at = Some(event.timestamp);
                item.status_reason = reason.clone();
                item.status_actor_id = Some(event.operator_id);
                item.status_actor_name = Some(event.operator_name.clone());
            }
            if *mark_reordered {
                snapshot.is_reordered = true;
            }
            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::types::OrderItemSnapshot;
    use shared::order::OrderEventType;

    #[test]
    fn test_removed_item_is_cancelled_not_deleted() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot
            .items
            .push(OrderItemSnapshot::new("inst-1".into(), 1, "Soup".into(), 450, 2));
        crate::pricing::recalculate_totals(&mut snapshot);
        assert_eq!(snapshot.total, 900);

        let event = OrderEvent::new(
            2,
            "order-1".to_string(),
            100,
            1,
            "Test".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::ItemRemoved,
            EventPayload::ItemRemoved {
                instance_id: "inst-1".to_string(),
                item_name: "Soup".to_string(),
                reason: Some("spilled".to_string()),
                mark_reordered: false,
                price_delta: -900,
            },
        );
        ItemRemovedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].status, ItemStatus::Cancelled);
        assert_eq!(snapshot.items[0].status_reason.as_deref(), Some("spilled"));
        assert_eq!(snapshot.total, 0);
    }
}
