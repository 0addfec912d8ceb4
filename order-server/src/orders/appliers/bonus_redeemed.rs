//! BonusRedeemed event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// BonusRedeemed applier
pub struct BonusRedeemedApplier;

impl EventApplier for BonusRedeemedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::BonusRedeemed { points, .. } = &event.payload {
            snapshot.bonus_points_used += points;
            super::touch(snapshot, event);
        }
    }
}
