//! PaymentSettled event applier

use crate::orders::traits::EventApplier;
use shared::order::types::PaymentStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// PaymentSettled applier
pub struct PaymentSettledApplier;

impl EventApplier for PaymentSettledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PaymentSettled { .. } = &event.payload {
            if let Some(payment) = &mut snapshot.payment {
                payment.status = PaymentStatus::Settled;
                payment.settled_at = Some(event.timestamp);
            }
            super::touch(snapshot, event);
        }
    }
}
