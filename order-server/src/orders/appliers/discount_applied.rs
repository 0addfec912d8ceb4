//! DiscountApplied event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// DiscountApplied applier
pub struct DiscountAppliedApplier;

impl EventApplier for DiscountAppliedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::DiscountApplied { application } = &event.payload {
            snapshot.discounts.push(application.clone());
            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{DiscountKind, DiscountTarget};
    use shared::order::types::{DiscountApplication, OrderItemSnapshot};
    use shared::order::OrderEventType;

    #[test]
    fn test_discount_applied_recomputes_total() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot
            .items
            .push(OrderItemSnapshot::new("inst-1".into(), 1, "Dish".into(), 1000, 1));
        crate::pricing::recalculate_totals(&mut snapshot);

        let event = OrderEvent::new(
            2,
            "order-1".to_string(),
            100,
            1,
            "Test".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::DiscountApplied,
            EventPayload::DiscountApplied {
                application: DiscountApplication {
                    discount_id: Some(1),
                    description: "10% off".to_string(),
                    kind: DiscountKind::Percentage,
                    value: Decimal::from(10),
                    target: DiscountTarget::All,
                    amount: 100,
                },
            },
        );
        DiscountAppliedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.discount_amount, 100);
        assert_eq!(snapshot.total, 900);
        assert!(snapshot.has_discount);
    }
}
