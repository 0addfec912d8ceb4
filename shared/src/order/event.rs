//! Order events - immutable facts recorded after command processing

use serde::{Deserialize, Serialize};

use super::status::{ItemStatus, OrderStatus};
use super::types::{
    AddOnAttachment, DiscountApplication, ItemChanges, OrderItemSnapshot, OrderType,
    SurchargeLine,
};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number - the authoritative ordering for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Restaurant scope (used for notification topics)
    pub restaurant_id: i64,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Client timestamp, preserved from the command for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: i64,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event
    pub command_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    OrderStatusChanged,
    OrderInfoUpdated,

    // Items
    ItemsAdded,
    ItemModified,
    ItemRemoved,
    ItemRefunded,
    ItemStatusChanged,

    // Tables
    TableAssigned,
    TableReleased,

    // Add-ons
    AddOnAttached,
    AddOnDetached,

    // Discounts / Bonus
    DiscountApplied,
    DiscountRemoved,
    BonusRedeemed,
    BonusRedemptionCancelled,

    // Payment
    PaymentSettled,
}

/// Event payload variants
///
/// Price deltas are recorded for audit; the authoritative totals are
/// recomputed from components by the appliers and must reproduce the
/// same values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    OrderCreated {
        restaurant_id: i64,
        order_number: String,
        order_type: OrderType,
        guest_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scheduled_for: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
        items: Vec<OrderItemSnapshot>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        addons: Vec<AddOnAttachment>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        surcharges: Vec<SurchargeLine>,
        payment_id: String,
    },

    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    OrderInfoUpdated {
        #[serde(skip_serializing_if = "Option::is_none")]
        guest_count: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_precheck: Option<bool>,
    },

    // ========== Items ==========
    ItemsAdded {
        /// Complete snapshots of added items
        items: Vec<OrderItemSnapshot>,
        /// Order is marked reordered (late addition after progress)
        #[serde(default)]
        mark_reordered: bool,
        /// Audit: total change in cents
        price_delta: i64,
    },

    ItemModified {
        instance_id: String,
        changes: ItemChanges,
        /// Previous values for comparison
        previous: ItemChanges,
        #[serde(default)]
        mark_reordered: bool,
        price_delta: i64,
    },

    ItemRemoved {
        instance_id: String,
        item_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default)]
        mark_reordered: bool,
        price_delta: i64,
    },

    ItemRefunded {
        instance_id: String,
        item_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default)]
        mark_reordered: bool,
        /// Amount removed from the order total, in cents
        refund_amount: i64,
    },

    ItemStatusChanged {
        instance_id: String,
        from: ItemStatus,
        to: ItemStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Tables ==========
    TableAssigned {
        table_id: i64,
        table_name: String,
        /// Previous table on reassignment
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_table_id: Option<i64>,
    },

    TableReleased { table_id: i64 },

    // ========== Add-ons ==========
    AddOnAttached { addon: AddOnAttachment },

    AddOnDetached {
        addon_id: i64,
        name: String,
        /// Amount removed from the order total, in cents
        price_delta: i64,
    },

    // ========== Discounts / Bonus ==========
    DiscountApplied { application: DiscountApplication },

    DiscountRemoved {
        #[serde(skip_serializing_if = "Option::is_none")]
        discount_id: Option<i64>,
        description: String,
        /// Exact amount restored to the total, in cents
        amount: i64,
    },

    BonusRedeemed {
        points: i64,
        /// Customer balance after the spend
        new_balance: i64,
    },

    BonusRedemptionCancelled {
        /// Points re-credited through the loyalty collaborator
        points: i64,
    },

    // ========== Payment ==========
    PaymentSettled { payment_id: String },
}

impl OrderEvent {
    /// Create a new event; the server timestamp is always stamped here
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        restaurant_id: i64,
        operator_id: i64,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            restaurant_id,
            timestamp: crate::util::now_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }
}
