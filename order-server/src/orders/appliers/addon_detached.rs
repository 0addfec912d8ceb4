//! AddOnDetached event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// AddOnDetached applier
pub struct AddOnDetachedApplier;

impl EventApplier for AddOnDetachedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::AddOnDetached { addon_id, .. } = &event.payload {
            snapshot.addons.retain(|a| a.addon_id != *addon_id);
            super::touch(snapshot, event);
        }
    }
}
