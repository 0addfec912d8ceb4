//! Pricing flows through the full command path: add-ons, surcharges,
//! discounts, bonus points, and the worked examples.

use super::*;
use shared::order::types::{AddOnInput, SurchargeInput, SurchargeMode};
use shared::order::{CommandErrorCode, OrderCommandPayload};

/// Worked example: item (300 + 50 additive) × 2 = 700, PER_PERSON add-on
/// 20 × 3 guests = 60, 10% surcharge on 760 = 76, total 836.
fn create_example_order(env: &TestEnv) -> OrderSnapshot {
    let mut item = item_input(1, 2);
    item.additive_ids = vec![9];
    must_order(
        env,
        OrderCommandPayload::CreateOrder {
            restaurant_id: RESTAURANT,
            order_type: OrderType::DineIn,
            guest_count: 3,
            customer_id: Some(CUSTOMER),
            scheduled_for: None,
            table_id: None,
            items: vec![item],
            addons: vec![AddOnInput { addon_id: 7, quantity: 1 }],
            surcharges: vec![SurchargeInput {
                name: "Service".into(),
                mode: SurchargeMode::Percentage,
                value: rust_decimal::Decimal::from(10),
            }],
        },
    )
}

#[tokio::test]
async fn test_worked_example_totals() {
    let env = env();
    let order = create_example_order(&env);

    assert_eq!(order.items_subtotal, 700);
    assert_eq!(order.addon_subtotal, 60);
    assert_eq!(order.surcharge_total, 76);
    assert_eq!(order.discount_amount, 0);
    assert_eq!(order.bonus_points_used, 0);
    assert_eq!(order.total, 836);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_bonus_redemption_and_cancellation_roundtrip() {
    let env = env();
    let order = create_example_order(&env);

    let after_redeem = must_order(
        &env,
        OrderCommandPayload::RedeemBonusPoints {
            order_id: order.order_id.clone(),
            points: 100,
        },
    );
    assert_eq!(after_redeem.total, 736);
    assert_eq!(after_redeem.bonus_points_used, 100);
    assert_eq!(env.loyalty.balance(CUSTOMER, RESTAURANT), 400);
    assert_reconciled(&env, &order.order_id);

    let after_cancel = must_order(
        &env,
        OrderCommandPayload::CancelBonusRedemption {
            order_id: order.order_id.clone(),
        },
    );
    assert_eq!(after_cancel.total, 836);
    assert_eq!(after_cancel.bonus_points_used, 0);
    assert_eq!(env.loyalty.balance(CUSTOMER, RESTAURANT), 500);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_insufficient_balance_leaves_everything_unchanged() {
    let env = env();
    let order = create_example_order(&env);

    let response = exec(
        &env,
        OrderCommandPayload::RedeemBonusPoints {
            order_id: order.order_id.clone(),
            points: 800,
        },
    );
    assert!(!response.success);
    assert_eq!(
        response.error.unwrap().code,
        CommandErrorCode::InsufficientBonusBalance
    );
    assert_eq!(env.loyalty.balance(CUSTOMER, RESTAURANT), 500);

    let snapshot = env.manager.get_snapshot(&order.order_id).unwrap().unwrap();
    assert_eq!(snapshot.total, 836);
    assert_eq!(snapshot.bonus_points_used, 0);
}

#[tokio::test]
async fn test_discount_apply_and_remove_roundtrip() {
    let env = env();
    let order = must_order(&env, create_payload(vec![item_input(1, 2)]));
    assert_eq!(order.total, 600);

    let after_apply = must_order(
        &env,
        OrderCommandPayload::ApplyDiscount {
            order_id: order.order_id.clone(),
            discount_id: Some(1),
        },
    );
    assert_eq!(after_apply.discount_amount, 60);
    assert_eq!(after_apply.total, 540);
    assert!(after_apply.has_discount);
    assert_eq!(env.discounts.usage_count(1), Some(1));
    assert_reconciled(&env, &order.order_id);

    let after_remove = must_order(
        &env,
        OrderCommandPayload::RemoveDiscount {
            order_id: order.order_id.clone(),
            discount_id: Some(1),
        },
    );
    assert_eq!(after_remove.total, 600);
    assert_eq!(after_remove.discount_amount, 0);
    assert!(after_remove.discount_canceled);
    assert_eq!(env.discounts.usage_count(1), Some(0));
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_product_targeted_discount_uses_matching_subtotal() {
    let env = env();
    let order = must_order(
        &env,
        create_payload(vec![item_input(1, 2), item_input(2, 2)]),
    );
    // Soup 600 + Stew 1000
    assert_eq!(order.total, 1600);

    let after = must_order(
        &env,
        OrderCommandPayload::ApplyDiscount {
            order_id: order.order_id.clone(),
            discount_id: Some(3),
        },
    );
    // Half of the stew subtotal only
    assert_eq!(after.discount_amount, 500);
    assert_eq!(after.total, 1100);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_personal_discount_from_loyalty() {
    let env = env();
    let order = create_example_order(&env);

    let after = must_order(
        &env,
        OrderCommandPayload::ApplyDiscount {
            order_id: order.order_id.clone(),
            discount_id: None,
        },
    );
    // 5% of 836, floored
    assert_eq!(after.discount_amount, 41);
    assert_eq!(after.total, 795);
    assert_eq!(after.discounts[0].discount_id, None);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_zero_amount_discount_rejected() {
    let env = env();
    // Order with no items: every discount computes to nothing
    let order = must_order(&env, create_payload(vec![]));

    let response = exec(
        &env,
        OrderCommandPayload::ApplyDiscount {
            order_id: order.order_id.clone(),
            discount_id: Some(1),
        },
    );
    assert!(!response.success);
    assert_eq!(response.error.unwrap().code, CommandErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_guest_count_change_reprices_per_person_addons() {
    let env = env();
    let order = create_example_order(&env);
    assert_eq!(order.addon_subtotal, 60);

    let after = must_order(
        &env,
        OrderCommandPayload::UpdateOrderInfo {
            order_id: order.order_id.clone(),
            guest_count: Some(5),
            is_precheck: None,
        },
    );
    assert_eq!(after.guest_count, 5);
    assert_eq!(after.addon_subtotal, 100);
    // Surcharge base moved with the add-on: floor(10% × 800) = 80
    assert_eq!(after.surcharge_total, 80);
    assert_eq!(after.total, 880);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_reduction_below_redeemed_bonus_rejected() {
    let env = env();
    let order = must_order(
        &env,
        OrderCommandPayload::CreateOrder {
            restaurant_id: RESTAURANT,
            order_type: OrderType::DineIn,
            guest_count: 1,
            customer_id: Some(CUSTOMER),
            scheduled_for: None,
            table_id: None,
            items: vec![item_input(1, 1)],
            addons: vec![],
            surcharges: vec![],
        },
    );
    assert_eq!(order.total, 300);

    must_order(
        &env,
        OrderCommandPayload::RedeemBonusPoints {
            order_id: order.order_id.clone(),
            points: 300,
        },
    );

    // Removing the only item would drive the total to -300
    let instance = order.items[0].instance_id.clone();
    let response = exec(
        &env,
        OrderCommandPayload::RemoveItem {
            order_id: order.order_id.clone(),
            instance_id: instance,
            reason: None,
        },
    );
    assert!(!response.success);
    assert_eq!(response.error.unwrap().code, CommandErrorCode::ValidationFailed);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_fixed_addon_attach_detach_roundtrip() {
    let env = env();
    let order = must_order(&env, create_payload(vec![item_input(1, 1)]));
    assert_eq!(order.total, 300);

    let after_attach = must_order(
        &env,
        OrderCommandPayload::AttachAddOn {
            order_id: order.order_id.clone(),
            addon_id: 8,
            quantity: 2,
        },
    );
    assert_eq!(after_attach.addon_subtotal, 300);
    assert_eq!(after_attach.total, 600);

    let after_detach = must_order(
        &env,
        OrderCommandPayload::DetachAddOn {
            order_id: order.order_id.clone(),
            addon_id: 8,
        },
    );
    assert_eq!(after_detach.total, 300);
    assert_reconciled(&env, &order.order_id);
}

#[tokio::test]
async fn test_quantity_change_applies_exact_delta() {
    let env = env();
    let order = must_order(&env, create_payload(vec![item_input(2, 1)]));
    assert_eq!(order.total, 500);

    let instance = order.items[0].instance_id.clone();
    let after = must_order(
        &env,
        OrderCommandPayload::ModifyItem {
            order_id: order.order_id.clone(),
            instance_id: instance,
            changes: shared::order::types::ItemChangesInput {
                quantity: Some(3),
                comment: None,
                additive_ids: None,
            },
        },
    );
    assert_eq!(after.total, 1500);
    assert_eq!(after.payment.as_ref().unwrap().amount, 1500);
    assert_reconciled(&env, &order.order_id);
}
