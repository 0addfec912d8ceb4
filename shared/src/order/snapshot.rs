//! Order snapshot - computed state from the event stream
//!
//! The snapshot is the fully-denormalized view returned from every
//! orchestrator operation: items with computed line totals, add-ons and
//! surcharges with computed amounts, discount applications, the linked
//! payment and the attention flags.

use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use super::types::{
    AddOnAttachment, DiscountApplication, OrderItemSnapshot, OrderType, PaymentRecord,
    PaymentStatus, SurchargeLine,
};

/// Order snapshot - computed from the event stream
///
/// Invariant, re-established after every mutation:
/// `total == items_subtotal + addon_subtotal + surcharge_total
///  - discount_amount - bonus_points_used`, and `total >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by the server)
    pub order_id: String,
    /// Human-readable sequential number, date-prefixed, unique
    pub order_number: String,
    pub restaurant_id: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Party size
    pub guest_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    pub items: Vec<OrderItemSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<AddOnAttachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub surcharges: Vec<SurchargeLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<DiscountApplication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,

    // === Money (minor currency units) ===
    #[serde(default)]
    pub items_subtotal: i64,
    #[serde(default)]
    pub addon_subtotal: i64,
    #[serde(default)]
    pub surcharge_total: i64,
    #[serde(default)]
    pub discount_amount: i64,
    #[serde(default)]
    pub bonus_points_used: i64,
    pub total: i64,

    // === Attention flags ===
    #[serde(default)]
    pub is_reordered: bool,
    #[serde(default)]
    pub has_discount: bool,
    #[serde(default)]
    pub discount_canceled: bool,
    #[serde(default)]
    pub is_precheck: bool,
    #[serde(default)]
    pub is_refund: bool,

    pub created_at: i64,
    pub updated_at: i64,
    /// Last applied event sequence (for incremental sync)
    pub last_sequence: u64,
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String) -> Self {
        let now = crate::util::now_millis();
        Self {
            order_id,
            order_number: String::new(),
            restaurant_id: 0,
            order_type: OrderType::DineIn,
            status: OrderStatus::Created,
            guest_count: 1,
            customer_id: None,
            scheduled_for: None,
            table_id: None,
            table_name: None,
            items: Vec::new(),
            addons: Vec::new(),
            surcharges: Vec::new(),
            discounts: Vec::new(),
            payment: None,
            items_subtotal: 0,
            addon_subtotal: 0,
            surcharge_total: 0,
            discount_amount: 0,
            bonus_points_used: 0,
            total: 0,
            is_reordered: false,
            has_discount: false,
            discount_canceled: false,
            is_precheck: false,
            is_refund: false,
            created_at: now,
            updated_at: now,
            last_sequence: 0,
        }
    }

    /// Check if the order is in a non-terminal status
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Find an item by instance id
    pub fn find_item(&self, instance_id: &str) -> Option<&OrderItemSnapshot> {
        self.items.iter().find(|i| i.instance_id == instance_id)
    }

    /// Find an item by instance id, mutable
    pub fn find_item_mut(&mut self, instance_id: &str) -> Option<&mut OrderItemSnapshot> {
        self.items.iter_mut().find(|i| i.instance_id == instance_id)
    }

    /// Whether the linked payment has been settled
    pub fn payment_settled(&self) -> bool {
        self.payment
            .as_ref()
            .is_some_and(|p| p.status == PaymentStatus::Settled)
    }

    /// Whether any item has left the Created status
    pub fn any_item_in_progress(&self) -> bool {
        self.items
            .iter()
            .any(|i| i.status != super::status::ItemStatus::Created)
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
