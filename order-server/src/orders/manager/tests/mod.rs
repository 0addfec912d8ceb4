//! Manager integration tests
//!
//! Every test drives the full command path: pre-transaction collaborator
//! reads, the write transaction, appliers, commit and post-commit
//! effects, against in-memory storage and collaborators.

mod test_pricing;

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::orders::manager::OrdersManager;
use crate::orders::storage::OrderStorage;
use crate::services::{
    InMemoryCatalog, InMemoryDiscounts, InMemoryLoyalty, InMemoryReservations, PersonalDiscount,
};
use shared::models::{
    AddOnPricingMode, Additive, DiningTable, Discount, DiscountKind, DiscountTarget, OrderAddOnDef,
    Product, TableStatus,
};
use shared::order::types::{OrderItemInput, OrderType};
use shared::order::{CommandResponse, OrderCommand, OrderCommandPayload, OrderSnapshot};

pub(crate) const RESTAURANT: i64 = 100;
pub(crate) const OTHER_RESTAURANT: i64 = 200;
pub(crate) const CUSTOMER: i64 = 42;

pub(crate) struct TestEnv {
    pub manager: OrdersManager,
    pub discounts: Arc<InMemoryDiscounts>,
    pub loyalty: Arc<InMemoryLoyalty>,
    pub reservations: Arc<InMemoryReservations>,
}

/// Build a manager over in-memory storage with a seeded catalog:
/// products 1 (Soup, 300) and 2 (Stew, 500), stop-listed product 3,
/// additive 9 (Cheese, 50), a PerPerson add-on 7 and a Fixed add-on 8,
/// three discounts, tables 1-3 for the restaurant and table 4 for a
/// different one, plus a loyalty customer with 500 points and a 5%
/// personal discount.
pub(crate) fn env() -> TestEnv {
    let storage = OrderStorage::open_in_memory().unwrap();

    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert_product(
        RESTAURANT,
        Product { id: 1, name: "Soup".into(), price: 300, is_stop_listed: false },
    );
    catalog.insert_product(
        RESTAURANT,
        Product { id: 2, name: "Stew".into(), price: 500, is_stop_listed: false },
    );
    catalog.insert_product(
        RESTAURANT,
        Product { id: 3, name: "Blocked".into(), price: 400, is_stop_listed: true },
    );
    catalog.insert_additive(Additive { id: 9, name: "Cheese".into(), price: 50 });
    catalog.insert_addon(OrderAddOnDef {
        id: 7,
        name: "Banquet service".into(),
        mode: AddOnPricingMode::PerPerson,
        price: 20,
    });
    catalog.insert_addon(OrderAddOnDef {
        id: 8,
        name: "Packaging".into(),
        mode: AddOnPricingMode::Fixed,
        price: 150,
    });

    let discounts = Arc::new(InMemoryDiscounts::new());
    discounts.insert(Discount {
        id: 1,
        description: "10% off".into(),
        kind: DiscountKind::Percentage,
        value: Decimal::from(10),
        target: DiscountTarget::All,
        usage_count: 0,
        is_active: true,
    });
    discounts.insert(Discount {
        id: 2,
        description: "200 voucher".into(),
        kind: DiscountKind::Fixed,
        value: Decimal::from(200),
        target: DiscountTarget::All,
        usage_count: 0,
        is_active: true,
    });
    discounts.insert(Discount {
        id: 3,
        description: "Half-price stew".into(),
        kind: DiscountKind::Percentage,
        value: Decimal::from(50),
        target: DiscountTarget::Products { product_ids: vec![2] },
        usage_count: 0,
        is_active: true,
    });

    let loyalty = Arc::new(InMemoryLoyalty::new());
    loyalty.set_balance(CUSTOMER, RESTAURANT, 500);
    loyalty.set_personal_discount(
        CUSTOMER,
        RESTAURANT,
        PersonalDiscount { percentage: Decimal::from(5), active: true },
    );

    let reservations = Arc::new(InMemoryReservations::new());

    for (id, restaurant_id) in [(1, RESTAURANT), (2, RESTAURANT), (3, RESTAURANT), (4, OTHER_RESTAURANT)] {
        storage
            .upsert_table(&DiningTable {
                id,
                restaurant_id,
                name: format!("T{id}"),
                capacity: 4,
                status: TableStatus::Available,
            })
            .unwrap();
    }

    let manager = OrdersManager::with_storage(storage, catalog, chrono_tz::Europe::Madrid)
        .with_discount_store(discounts.clone())
        .with_loyalty(loyalty.clone())
        .with_reservations(reservations.clone());

    TestEnv {
        manager,
        discounts,
        loyalty,
        reservations,
    }
}

pub(crate) fn cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new(1, "Tester", payload)
}

pub(crate) fn item_input(product_id: i64, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        additive_ids: vec![],
        comment: None,
    }
}

pub(crate) fn create_payload(items: Vec<OrderItemInput>) -> OrderCommandPayload {
    OrderCommandPayload::CreateOrder {
        restaurant_id: RESTAURANT,
        order_type: OrderType::DineIn,
        guest_count: 2,
        customer_id: None,
        scheduled_for: None,
        table_id: None,
        items,
        addons: vec![],
        surcharges: vec![],
    }
}

/// Execute a payload and unwrap the success response
pub(crate) fn exec(env: &TestEnv, payload: OrderCommandPayload) -> CommandResponse {
    env.manager.execute_command(cmd(payload))
}

/// Execute and return the denormalized snapshot from the response
pub(crate) fn must_order(env: &TestEnv, payload: OrderCommandPayload) -> OrderSnapshot {
    let response = exec(env, payload);
    assert!(response.success, "command failed: {:?}", response.error);
    *response.order.expect("response should carry a snapshot")
}

/// The core invariant: the stored total equals recomputation from its
/// components, and replaying the event stream reproduces the same money.
pub(crate) fn assert_reconciled(env: &TestEnv, order_id: &str) {
    let snapshot = env.manager.get_snapshot(order_id).unwrap().unwrap();
    let expected = snapshot.items_subtotal + snapshot.addon_subtotal + snapshot.surcharge_total
        - snapshot.discount_amount
        - snapshot.bonus_points_used;
    assert_eq!(snapshot.total, expected, "stored total out of sync with components");
    assert!(snapshot.total >= 0, "order total must never be negative");

    let rebuilt = env.manager.rebuild_snapshot(order_id).unwrap();
    assert_eq!(rebuilt.total, snapshot.total, "replay diverged from stored total");
    assert_eq!(rebuilt.items_subtotal, snapshot.items_subtotal);
    assert_eq!(rebuilt.addon_subtotal, snapshot.addon_subtotal);
    assert_eq!(rebuilt.surcharge_total, snapshot.surcharge_total);
    assert_eq!(rebuilt.discount_amount, snapshot.discount_amount);
    assert_eq!(rebuilt.bonus_points_used, snapshot.bonus_points_used);
}
