//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and folds one event
//! type into the snapshot. Appliers are pure: no storage access, no
//! validation - actions have already validated. Every applier finishes
//! through [`touch`], which recomputes all derived money fields so the
//! stored totals always equal recomputation from components.

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use crate::pricing;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

mod addon_attached;
mod addon_detached;
mod bonus_cancelled;
mod bonus_redeemed;
mod discount_applied;
mod discount_removed;
mod item_modified;
mod item_refunded;
mod item_removed;
mod item_status_changed;
mod items_added;
mod order_created;
mod order_info_updated;
mod order_status_changed;
mod payment_settled;
mod table_assigned;
mod table_released;

pub use addon_attached::AddOnAttachedApplier;
pub use addon_detached::AddOnDetachedApplier;
pub use bonus_cancelled::BonusCancelledApplier;
pub use bonus_redeemed::BonusRedeemedApplier;
pub use discount_applied::DiscountAppliedApplier;
pub use discount_removed::DiscountRemovedApplier;
pub use item_modified::ItemModifiedApplier;
pub use item_refunded::ItemRefundedApplier;
pub use item_removed::ItemRemovedApplier;
pub use item_status_changed::ItemStatusChangedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_created::OrderCreatedApplier;
pub use order_info_updated::OrderInfoUpdatedApplier;
pub use order_status_changed::OrderStatusChangedApplier;
pub use payment_settled::PaymentSettledApplier;
pub use table_assigned::TableAssignedApplier;
pub use table_released::TableReleasedApplier;

/// EventAction enum - dispatches to concrete applier implementations
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    OrderStatusChanged(OrderStatusChangedApplier),
    OrderInfoUpdated(OrderInfoUpdatedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemModified(ItemModifiedApplier),
    ItemRemoved(ItemRemovedApplier),
    ItemRefunded(ItemRefundedApplier),
    ItemStatusChanged(ItemStatusChangedApplier),
    TableAssigned(TableAssignedApplier),
    TableReleased(TableReleasedApplier),
    AddOnAttached(AddOnAttachedApplier),
    AddOnDetached(AddOnDetachedApplier),
    DiscountApplied(DiscountAppliedApplier),
    DiscountRemoved(DiscountRemovedApplier),
    BonusRedeemed(BonusRedeemedApplier),
    BonusCancelled(BonusCancelledApplier),
    PaymentSettled(PaymentSettledApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload for dispatch.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::OrderStatusChanged { .. } => {
                EventAction::OrderStatusChanged(OrderStatusChangedApplier)
            }
            EventPayload::OrderInfoUpdated { .. } => {
                EventAction::OrderInfoUpdated(OrderInfoUpdatedApplier)
            }
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemModified { .. } => EventAction::ItemModified(ItemModifiedApplier),
            EventPayload::ItemRemoved { .. } => EventAction::ItemRemoved(ItemRemovedApplier),
            EventPayload::ItemRefunded { .. } => EventAction::ItemRefunded(ItemRefundedApplier),
            EventPayload::ItemStatusChanged { .. } => {
                EventAction::ItemStatusChanged(ItemStatusChangedApplier)
            }
            EventPayload::TableAssigned { .. } => EventAction::TableAssigned(TableAssignedApplier),
            EventPayload::TableReleased { .. } => EventAction::TableReleased(TableReleasedApplier),
            EventPayload::AddOnAttached { .. } => EventAction::AddOnAttached(AddOnAttachedApplier),
            EventPayload::AddOnDetached { .. } => EventAction::AddOnDetached(AddOnDetachedApplier),
            EventPayload::DiscountApplied { .. } => {
                EventAction::DiscountApplied(DiscountAppliedApplier)
            }
            EventPayload::DiscountRemoved { .. } => {
                EventAction::DiscountRemoved(DiscountRemovedApplier)
            }
            EventPayload::BonusRedeemed { .. } => EventAction::BonusRedeemed(BonusRedeemedApplier),
            EventPayload::BonusRedemptionCancelled { .. } => {
                EventAction::BonusCancelled(BonusCancelledApplier)
            }
            EventPayload::PaymentSettled { .. } => {
                EventAction::PaymentSettled(PaymentSettledApplier)
            }
        }
    }
}

/// Common applier epilogue: stamp sequence/update time and recompute all
/// derived money fields.
pub(crate) fn touch(snapshot: &mut OrderSnapshot, event: &OrderEvent) {
    snapshot.last_sequence = event.sequence;
    snapshot.updated_at = event.timestamp;
    pricing::recalculate_totals(snapshot);
}
