//! TableReleased event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableReleased applier
pub struct TableReleasedApplier;

impl EventApplier for TableReleasedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableReleased { table_id } = &event.payload {
            if snapshot.table_id == Some(*table_id) {
                snapshot.table_id = None;
                snapshot.table_name = None;
            }
            super::touch(snapshot, event);
        }
    }
}
