//! BonusRedemptionCancelled event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// BonusRedemptionCancelled applier
pub struct BonusCancelledApplier;

impl EventApplier for BonusCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::BonusRedemptionCancelled { points } = &event.payload {
            snapshot.bonus_points_used = (snapshot.bonus_points_used - points).max(0);
            super::touch(snapshot, event);
        }
    }
}
