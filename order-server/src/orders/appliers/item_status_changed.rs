//! ItemStatusChanged event applier
//!
//! Entering InProgress stamps the start time and assigns the acting user
//! if the item has no assignee yet; terminal and pause transitions stamp
//! their time/actor fields.

use crate::orders::traits::EventApplier;
use shared::order::status::ItemStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemStatusChanged applier
pub struct ItemStatusChangedApplier;

impl EventApplier for ItemStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemStatusChanged {
            instance_id,
            to,
            reason,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(instance_id) {
                item.status = *to;
                match to {
                    ItemStatus::InProgress => {
                        if item.started_at.is_none() {
                            item.started_at = Some(event.timestamp);
                        }
                        if item.assignee_id.is_none() {
                            item.assignee_id = Some(event.operator_id);
                            item.assignee_name = Some(event.operator_name.clone());
                        }
                    }
                    ItemStatus::Paused => {
                        item.paused_at = Some(event.timestamp);
                    }
                    ItemStatus::Completed => {
                        item.completed_at = Some(event.timestamp);
                        item.status_actor_id = Some(event.operator_id);
                        item.status_actor_name = Some(event.operator_name.clone());
                    }
                    ItemStatus::Cancelled => {
                        item.cancelled_at = Some(event.timestamp);
                        item.status_reason = reason.clone();
                        item.status_actor_id = Some(event.operator_id);
                        item.status_actor_name = Some(event.operator_name.clone());
                    }
                    ItemStatus::Created | ItemStatus::PartiallyDone | ItemStatus::Refunded => {}
                }
            }
            super::touch(snapshot, event);
        }
    }
}
