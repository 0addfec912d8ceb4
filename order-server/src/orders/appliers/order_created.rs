//! OrderCreated event applier

use crate::orders::traits::EventApplier;
use shared::order::types::{PaymentRecord, PaymentStatus};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderCreated applier
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            restaurant_id,
            order_number,
            order_type,
            guest_count,
            customer_id,
            scheduled_for,
            table_id,
            table_name,
            items,
            addons,
            surcharges,
            payment_id,
        } = &event.payload
        {
            snapshot.restaurant_id = *restaurant_id;
            snapshot.order_number = order_number.clone();
            snapshot.order_type = *order_type;
            snapshot.guest_count = *guest_count;
            snapshot.customer_id = *customer_id;
            snapshot.scheduled_for = *scheduled_for;
            snapshot.table_id = *table_id;
            snapshot.table_name = table_name.clone();
            snapshot.items = items.clone();
            snapshot.addons = addons.clone();
            snapshot.surcharges = surcharges.clone();
            snapshot.payment = Some(PaymentRecord {
                payment_id: payment_id.clone(),
                amount: 0,
                status: PaymentStatus::Pending,
                created_at: event.timestamp,
                settled_at: None,
            });
            snapshot.created_at = event.timestamp;

            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::types::{OrderItemSnapshot, OrderType};
    use shared::order::OrderEventType;

    #[test]
    fn test_order_created_initializes_snapshot() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        let event = OrderEvent::new(
            1,
            "order-1".to_string(),
            100,
            1,
            "Test".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                restaurant_id: 100,
                order_number: "20260806-0042".to_string(),
                order_type: OrderType::DineIn,
                guest_count: 2,
                customer_id: Some(7),
                scheduled_for: None,
                table_id: None,
                table_name: None,
                items: vec![OrderItemSnapshot::new(
                    "inst-1".into(),
                    1,
                    "Soup".into(),
                    450,
                    2,
                )],
                addons: vec![],
                surcharges: vec![],
                payment_id: "pay-1".to_string(),
            },
        );

        OrderCreatedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.order_number, "20260806-0042");
        assert_eq!(snapshot.total, 900);
        let payment = snapshot.payment.as_ref().unwrap();
        assert_eq!(payment.amount, 900);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(snapshot.last_sequence, 1);
    }
}
