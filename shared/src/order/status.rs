//! Order and item status machines
//!
//! Transition validity is expressed as lookup tables (`allowed_next`)
//! over closed enums so the whole state machine is testable as pure data.

use serde::{Deserialize, Serialize};

use super::types::{OrderItemSnapshot, OrderType};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Created,
    Confirmed,
    Preparing,
    Ready,
    /// Delivery orders only
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses reachable from `self` for the given order type
    pub fn allowed_next(self, order_type: OrderType) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Created => &[Confirmed, Cancelled],
            Confirmed => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => match order_type {
                OrderType::Delivery => &[Delivering, Completed],
                _ => &[Completed],
            },
            Delivering => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    /// Whether `self → to` is a valid transition
    pub fn can_transition(self, to: OrderStatus, order_type: OrderType) -> bool {
        self.allowed_next(order_type).contains(&to)
    }

    /// Terminal statuses admit no further transition
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Created,
    InProgress,
    PartiallyDone,
    Paused,
    Completed,
    Cancelled,
    /// Side-channel terminal marker, reached only through the explicit
    /// refund operation, never through `allowed_next`.
    Refunded,
}

impl ItemStatus {
    /// Statuses reachable from `self` through the forward chain
    pub fn allowed_next(self) -> &'static [ItemStatus] {
        use ItemStatus::*;
        match self {
            Created => &[InProgress, Cancelled],
            InProgress => &[PartiallyDone, Paused, Completed, Cancelled],
            PartiallyDone => &[InProgress],
            Paused => &[InProgress],
            Completed | Cancelled | Refunded => &[],
        }
    }

    /// Whether `self → to` is a valid forward transition
    pub fn can_transition(self, to: ItemStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ItemStatus::Completed | ItemStatus::Cancelled | ItemStatus::Refunded
        )
    }

    /// Refund is an operator action independent of the forward chain:
    /// any non-terminal state and Completed are refundable, Cancelled and
    /// already-Refunded are not.
    pub fn can_refund(self) -> bool {
        !matches!(self, ItemStatus::Cancelled | ItemStatus::Refunded)
    }

    /// Items excluded from totals and status derivation
    pub fn is_voided(self) -> bool {
        matches!(self, ItemStatus::Cancelled | ItemStatus::Refunded)
    }
}

/// Derive the order status from aggregate item status.
///
/// Runs after every item-status mutation: if all non-voided items are
/// completed the order becomes Ready; if any item is in progress the
/// order becomes Preparing; otherwise the explicit status is kept.
/// Terminal order statuses are never overridden.
pub fn derive_order_status(items: &[OrderItemSnapshot], current: OrderStatus) -> OrderStatus {
    if current.is_terminal() {
        return current;
    }
    let mut any = false;
    let mut all_completed = true;
    let mut any_in_progress = false;
    for item in items.iter().filter(|i| !i.status.is_voided()) {
        any = true;
        if item.status != ItemStatus::Completed {
            all_completed = false;
        }
        if item.status == ItemStatus::InProgress {
            any_in_progress = true;
        }
    }
    if any && all_completed {
        OrderStatus::Ready
    } else if any_in_progress {
        OrderStatus::Preparing
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::types::OrderItemSnapshot;

    fn item(status: ItemStatus) -> OrderItemSnapshot {
        let mut i = OrderItemSnapshot::new("inst".into(), 1, "Test".into(), 100, 1);
        i.status = status;
        i
    }

    #[test]
    fn test_order_transitions_forward_chain() {
        use OrderStatus::*;
        assert!(Created.can_transition(Confirmed, OrderType::DineIn));
        assert!(Confirmed.can_transition(Preparing, OrderType::DineIn));
        assert!(Preparing.can_transition(Ready, OrderType::DineIn));
        assert!(Ready.can_transition(Completed, OrderType::DineIn));
        assert!(!Created.can_transition(Ready, OrderType::DineIn));
        assert!(!Completed.can_transition(Confirmed, OrderType::DineIn));
    }

    #[test]
    fn test_delivering_only_for_delivery_orders() {
        use OrderStatus::*;
        assert!(Ready.can_transition(Delivering, OrderType::Delivery));
        assert!(!Ready.can_transition(Delivering, OrderType::DineIn));
        assert!(!Ready.can_transition(Delivering, OrderType::Takeaway));
        assert!(Delivering.can_transition(Completed, OrderType::Delivery));
    }

    #[test]
    fn test_cancel_window() {
        use OrderStatus::*;
        assert!(Created.can_transition(Cancelled, OrderType::DineIn));
        assert!(Confirmed.can_transition(Cancelled, OrderType::DineIn));
        assert!(Preparing.can_transition(Cancelled, OrderType::DineIn));
        assert!(!Ready.can_transition(Cancelled, OrderType::DineIn));
        assert!(!Delivering.can_transition(Cancelled, OrderType::Delivery));
        assert!(!Completed.can_transition(Cancelled, OrderType::DineIn));
    }

    #[test]
    fn test_item_transitions() {
        use ItemStatus::*;
        assert!(Created.can_transition(InProgress));
        assert!(InProgress.can_transition(PartiallyDone));
        assert!(PartiallyDone.can_transition(InProgress));
        assert!(Paused.can_transition(InProgress));
        assert!(InProgress.can_transition(Completed));
        // Terminal states admit nothing
        assert!(!Completed.can_transition(InProgress));
        assert!(!Cancelled.can_transition(InProgress));
        assert!(!Refunded.can_transition(InProgress));
        // Refunded is never a forward target
        assert!(!InProgress.can_transition(Refunded));
    }

    #[test]
    fn test_refund_eligibility() {
        use ItemStatus::*;
        assert!(Created.can_refund());
        assert!(InProgress.can_refund());
        assert!(Paused.can_refund());
        assert!(Completed.can_refund());
        assert!(!Cancelled.can_refund());
        assert!(!Refunded.can_refund());
    }

    #[test]
    fn test_derivation_all_completed_yields_ready() {
        let items = vec![
            item(ItemStatus::Completed),
            item(ItemStatus::Completed),
            item(ItemStatus::Cancelled), // voided items ignored
        ];
        assert_eq!(
            derive_order_status(&items, OrderStatus::Preparing),
            OrderStatus::Ready
        );
    }

    #[test]
    fn test_derivation_any_in_progress_yields_preparing() {
        let items = vec![item(ItemStatus::Completed), item(ItemStatus::InProgress)];
        assert_eq!(
            derive_order_status(&items, OrderStatus::Confirmed),
            OrderStatus::Preparing
        );
    }

    #[test]
    fn test_derivation_keeps_explicit_status() {
        let items = vec![item(ItemStatus::Created), item(ItemStatus::Paused)];
        assert_eq!(
            derive_order_status(&items, OrderStatus::Confirmed),
            OrderStatus::Confirmed
        );
    }

    #[test]
    fn test_derivation_never_overrides_terminal() {
        let items = vec![item(ItemStatus::Completed)];
        assert_eq!(
            derive_order_status(&items, OrderStatus::Cancelled),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_derivation_empty_order_keeps_status() {
        assert_eq!(
            derive_order_status(&[], OrderStatus::Created),
            OrderStatus::Created
        );
    }
}
