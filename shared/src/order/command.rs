//! Order commands - requests from clients to mutate orders

use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use super::types::{
    AddOnInput, ItemChangesInput, ItemStatusUpdate, OrderItemInput, OrderType, SurchargeInput,
};

/// Command envelope with operator identity and idempotency key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Idempotency key; replays are acknowledged without re-execution
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds), preserved for audit
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(operator_id: i64, operator_name: impl Into<String>, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id,
            operator_name: operator_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    // ========== Lifecycle ==========
    CreateOrder {
        restaurant_id: i64,
        order_type: OrderType,
        /// Party size; must be >= 1
        guest_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<i64>,
        /// Required for Scheduled orders (Unix milliseconds)
        #[serde(skip_serializing_if = "Option::is_none")]
        scheduled_for: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<i64>,
        items: Vec<OrderItemInput>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        addons: Vec<AddOnInput>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        surcharges: Vec<SurchargeInput>,
    },

    UpdateOrderStatus {
        order_id: String,
        status: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Time-driven start of a scheduled order; idempotent
    StartScheduledOrder { order_id: String },

    UpdateOrderInfo {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        guest_count: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_precheck: Option<bool>,
    },

    // ========== Items ==========
    AddItems {
        order_id: String,
        items: Vec<OrderItemInput>,
    },

    ModifyItem {
        order_id: String,
        instance_id: String,
        changes: ItemChangesInput,
    },

    RemoveItem {
        order_id: String,
        instance_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    RefundItem {
        order_id: String,
        instance_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Bulk item status update; all-or-nothing on membership validation
    UpdateItemStatus {
        order_id: String,
        updates: Vec<ItemStatusUpdate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Tables ==========
    AssignTable { order_id: String, table_id: i64 },

    UnassignTable { order_id: String },

    // ========== Add-ons ==========
    AttachAddOn {
        order_id: String,
        addon_id: i64,
        quantity: i32,
    },

    DetachAddOn { order_id: String, addon_id: i64 },

    // ========== Discounts / Bonus ==========
    /// `discount_id = None` applies the customer's personal discount
    ApplyDiscount {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        discount_id: Option<i64>,
    },

    RemoveDiscount {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        discount_id: Option<i64>,
    },

    RedeemBonusPoints { order_id: String, points: i64 },

    CancelBonusRedemption { order_id: String },

    // ========== Payment ==========
    SettlePayment { order_id: String },
}

impl OrderCommandPayload {
    /// Order targeted by this command, None for creation
    pub fn order_id(&self) -> Option<&str> {
        use OrderCommandPayload::*;
        match self {
            CreateOrder { .. } => None,
            UpdateOrderStatus { order_id, .. }
            | StartScheduledOrder { order_id }
            | UpdateOrderInfo { order_id, .. }
            | AddItems { order_id, .. }
            | ModifyItem { order_id, .. }
            | RemoveItem { order_id, .. }
            | RefundItem { order_id, .. }
            | UpdateItemStatus { order_id, .. }
            | AssignTable { order_id, .. }
            | UnassignTable { order_id }
            | AttachAddOn { order_id, .. }
            | DetachAddOn { order_id, .. }
            | ApplyDiscount { order_id, .. }
            | RemoveDiscount { order_id, .. }
            | RedeemBonusPoints { order_id, .. }
            | CancelBonusRedemption { order_id }
            | SettlePayment { order_id } => Some(order_id),
        }
    }
}
