//! Pure pricing calculator
//!
//! All inputs and outputs are i64 minor currency units (cents); prices on
//! items, additives and add-on attachments are the frozen attach-time
//! values and are never re-read from the catalog here. Percentage math
//! goes through `rust_decimal` and is floor-rounded back to cents.
//!
//! [`recalculate_totals`] is the single authority for order money: every
//! event applier calls it after folding an event, and the incremental
//! deltas recorded on events must reproduce exactly the values it
//! computes.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::models::discount::{DiscountKind, DiscountTarget};
use shared::models::order_addon::AddOnPricingMode;
use shared::order::types::{
    AddOnAttachment, DiscountApplication, OrderItemSnapshot, PaymentStatus, SurchargeMode,
};
use shared::order::OrderSnapshot;

/// Line total for one item: (unit price + Σ additive prices) × quantity.
///
/// Cancelled and refunded items contribute nothing.
pub fn item_line_total(item: &OrderItemSnapshot) -> i64 {
    if item.status.is_voided() {
        return 0;
    }
    let additive_sum: i64 = item.additives.iter().map(|a| a.price).sum();
    (item.unit_price + additive_sum) * item.quantity as i64
}

/// Sum of line totals over non-voided items
pub fn items_subtotal(items: &[OrderItemSnapshot]) -> i64 {
    items.iter().map(item_line_total).sum()
}

/// Total quantity across non-voided items (base for PerItem add-ons)
pub fn countable_quantity(items: &[OrderItemSnapshot]) -> i64 {
    items
        .iter()
        .filter(|i| !i.status.is_voided())
        .map(|i| i.quantity as i64)
        .sum()
}

/// Contribution of one add-on attachment
pub fn addon_amount(addon: &AddOnAttachment, item_quantity: i64, guest_count: i32) -> i64 {
    let base = addon.unit_price * addon.quantity as i64;
    match addon.mode {
        AddOnPricingMode::Fixed => base,
        AddOnPricingMode::PerItem => base * item_quantity,
        AddOnPricingMode::PerPerson => base * guest_count.max(0) as i64,
    }
}

/// floor(base × percent / 100), in cents
pub fn percentage_of(base: i64, percent: Decimal) -> i64 {
    (Decimal::from(base) * percent / Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(0)
}

/// Surcharge amount against the given base (items + add-ons)
pub fn surcharge_amount(mode: SurchargeMode, value: Decimal, base: i64) -> i64 {
    match mode {
        SurchargeMode::Fixed => value.floor().to_i64().unwrap_or(0),
        SurchargeMode::Percentage => percentage_of(base, value),
    }
}

/// Subtotal of non-voided items matching a product list
pub fn product_subset_subtotal(items: &[OrderItemSnapshot], product_ids: &[i64]) -> i64 {
    items
        .iter()
        .filter(|i| product_ids.contains(&i.product_id))
        .map(item_line_total)
        .sum()
}

/// Amount for one discount application.
///
/// `running_total` is the order total before this discount; percentage
/// discounts floor, fixed discounts are capped so the result never
/// exceeds either its base or the running total.
pub fn discount_amount(
    application: &DiscountApplication,
    running_total: i64,
    items: &[OrderItemSnapshot],
) -> i64 {
    let base = match &application.target {
        DiscountTarget::All => running_total,
        DiscountTarget::Products { product_ids } => product_subset_subtotal(items, product_ids),
    };
    match application.kind {
        DiscountKind::Percentage => percentage_of(base, application.value).min(running_total),
        DiscountKind::Fixed => {
            let value = application.value.floor().to_i64().unwrap_or(0);
            value.min(base).min(running_total)
        }
    }
}

/// Recompute every derived monetary field of the snapshot from its
/// components: item line totals, add-on amounts, surcharges, discount
/// applications (in application order) and bonus redemption.
///
/// A pending payment tracks the order total; settled payments are left
/// untouched.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    for item in &mut snapshot.items {
        item.line_total = item_line_total(item);
    }
    let items_subtotal: i64 = snapshot.items.iter().map(|i| i.line_total).sum();

    let quantity = countable_quantity(&snapshot.items);
    for addon in &mut snapshot.addons {
        addon.amount = addon_amount(addon, quantity, snapshot.guest_count);
    }
    let addon_subtotal: i64 = snapshot.addons.iter().map(|a| a.amount).sum();

    let surcharge_base = items_subtotal + addon_subtotal;
    for surcharge in &mut snapshot.surcharges {
        surcharge.amount = surcharge_amount(surcharge.mode, surcharge.value, surcharge_base);
    }
    let surcharge_total: i64 = snapshot.surcharges.iter().map(|s| s.amount).sum();

    let mut running = items_subtotal + addon_subtotal + surcharge_total;
    let items = snapshot.items.clone();
    for application in &mut snapshot.discounts {
        application.amount = discount_amount(application, running, &items);
        running -= application.amount;
    }
    let discount_total: i64 = snapshot.discounts.iter().map(|d| d.amount).sum();

    snapshot.items_subtotal = items_subtotal;
    snapshot.addon_subtotal = addon_subtotal;
    snapshot.surcharge_total = surcharge_total;
    snapshot.discount_amount = discount_total;
    snapshot.total =
        items_subtotal + addon_subtotal + surcharge_total - discount_total - snapshot.bonus_points_used;

    if let Some(payment) = &mut snapshot.payment
        && payment.status == PaymentStatus::Pending
    {
        payment.amount = snapshot.total;
    }

    snapshot.has_discount = !snapshot.discounts.is_empty();
}

/// Total the snapshot would have after recalculation, without mutating it.
///
/// Used by actions to validate a prospective mutation (e.g. that removing
/// an item does not push a bonus-redeemed order negative) before any
/// event is emitted.
pub fn recomputed_total(snapshot: &OrderSnapshot) -> i64 {
    let mut probe = snapshot.clone();
    recalculate_totals(&mut probe);
    probe.total
}
