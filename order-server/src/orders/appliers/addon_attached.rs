//! AddOnAttached event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// AddOnAttached applier
pub struct AddOnAttachedApplier;

impl EventApplier for AddOnAttachedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::AddOnAttached { addon } = &event.payload {
            snapshot.addons.push(addon.clone());
            super::touch(snapshot, event);
        }
    }
}
