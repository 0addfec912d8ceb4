//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! specific command type: validate against the current snapshot, then
//! emit events. Actions never mutate snapshots directly; the appliers
//! fold the emitted events.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::{Additive, Product};
use shared::order::types::{AdditiveSnapshot, OrderItemInput, OrderItemSnapshot};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

mod add_items;
mod apply_discount;
mod assign_table;
mod attach_addon;
mod cancel_bonus;
mod create_order;
mod detach_addon;
mod modify_item;
mod redeem_bonus;
mod refund_item;
mod remove_discount;
mod remove_item;
mod settle_payment;
mod start_scheduled;
mod unassign_table;
mod update_item_status;
mod update_order_info;
mod update_order_status;

pub use add_items::AddItemsAction;
pub use apply_discount::ApplyDiscountAction;
pub use assign_table::AssignTableAction;
pub use attach_addon::AttachAddOnAction;
pub use cancel_bonus::CancelBonusRedemptionAction;
pub use create_order::CreateOrderAction;
pub use detach_addon::DetachAddOnAction;
pub use modify_item::ModifyItemAction;
pub use redeem_bonus::RedeemBonusAction;
pub use refund_item::RefundItemAction;
pub use remove_discount::RemoveDiscountAction;
pub use remove_item::RemoveItemAction;
pub use settle_payment::SettlePaymentAction;
pub use start_scheduled::StartScheduledOrderAction;
pub use unassign_table::UnassignTableAction;
pub use update_item_status::UpdateItemStatusAction;
pub use update_order_info::UpdateOrderInfoAction;
pub use update_order_status::UpdateOrderStatusAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    UpdateOrderStatus(UpdateOrderStatusAction),
    StartScheduledOrder(StartScheduledOrderAction),
    UpdateOrderInfo(UpdateOrderInfoAction),
    AddItems(AddItemsAction),
    ModifyItem(ModifyItemAction),
    RemoveItem(RemoveItemAction),
    RefundItem(RefundItemAction),
    UpdateItemStatus(UpdateItemStatusAction),
    AssignTable(AssignTableAction),
    UnassignTable(UnassignTableAction),
    AttachAddOn(AttachAddOnAction),
    DetachAddOn(DetachAddOnAction),
    ApplyDiscount(ApplyDiscountAction),
    RemoveDiscount(RemoveDiscountAction),
    RedeemBonus(RedeemBonusAction),
    CancelBonusRedemption(CancelBonusRedemptionAction),
    SettlePayment(SettlePaymentAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateOrderStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::StartScheduledOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateOrderInfo(action) => action.execute(ctx, metadata).await,
            CommandAction::AddItems(action) => action.execute(ctx, metadata).await,
            CommandAction::ModifyItem(action) => action.execute(ctx, metadata).await,
            CommandAction::RemoveItem(action) => action.execute(ctx, metadata).await,
            CommandAction::RefundItem(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateItemStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::AssignTable(action) => action.execute(ctx, metadata).await,
            CommandAction::UnassignTable(action) => action.execute(ctx, metadata).await,
            CommandAction::AttachAddOn(action) => action.execute(ctx, metadata).await,
            CommandAction::DetachAddOn(action) => action.execute(ctx, metadata).await,
            CommandAction::ApplyDiscount(action) => action.execute(ctx, metadata).await,
            CommandAction::RemoveDiscount(action) => action.execute(ctx, metadata).await,
            CommandAction::RedeemBonus(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelBonusRedemption(action) => action.execute(ctx, metadata).await,
            CommandAction::SettlePayment(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Build an event with command metadata filled in
pub(crate) fn make_event(
    sequence: u64,
    order_id: &str,
    restaurant_id: i64,
    metadata: &CommandMetadata,
    event_type: OrderEventType,
    payload: EventPayload,
) -> OrderEvent {
    OrderEvent::new(
        sequence,
        order_id.to_string(),
        restaurant_id,
        metadata.operator_id,
        metadata.operator_name.clone(),
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        event_type,
        payload,
    )
}

/// Resolve item inputs against the pre-fetched catalog into frozen-price
/// snapshots.
///
/// Fails on missing or stop-listed products, missing additives, or a
/// non-positive quantity. The resolved prices are the restaurant's
/// current catalog prices, frozen from here on.
pub(crate) fn build_item_snapshots(
    inputs: &[OrderItemInput],
    products: &HashMap<i64, Product>,
    additives: &HashMap<i64, Additive>,
    reordered: bool,
) -> Result<Vec<OrderItemSnapshot>, OrderError> {
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "quantity must be at least 1 for product {}",
                input.product_id
            )));
        }
        let product = products
            .get(&input.product_id)
            .ok_or(OrderError::ProductNotFound(input.product_id))?;
        if product.is_stop_listed {
            return Err(OrderError::ProductStopListed(product.id));
        }

        let mut item = OrderItemSnapshot::new(
            uuid::Uuid::new_v4().to_string(),
            product.id,
            product.name.clone(),
            product.price,
            input.quantity,
        );
        for additive_id in &input.additive_ids {
            let additive = additives
                .get(additive_id)
                .ok_or(OrderError::AdditiveNotFound(*additive_id))?;
            item.additives.push(AdditiveSnapshot {
                id: additive.id,
                name: additive.name.clone(),
                price: additive.price,
            });
        }
        item.comment = input.comment.clone();
        item.is_reordered = reordered;
        items.push(item);
    }
    Ok(items)
}

/// Reject mutations of an order whose payment is settled
pub(crate) fn ensure_not_settled(
    snapshot: &shared::order::OrderSnapshot,
) -> Result<(), OrderError> {
    if snapshot.payment_settled() {
        return Err(OrderError::OrderAlreadyPaid(snapshot.order_id.clone()));
    }
    Ok(())
}

/// Reject operations on terminal orders
pub(crate) fn ensure_active(snapshot: &shared::order::OrderSnapshot) -> Result<(), OrderError> {
    if !snapshot.is_active() {
        return Err(OrderError::InvalidOperation(format!(
            "Order {} is in terminal status {:?}",
            snapshot.order_id, snapshot.status
        )));
    }
    Ok(())
}
