//! Shared types for the order engine
//!
//! All monetary values are i64 minor currency units (cents). Prices on
//! items, additives and add-on attachments are frozen at attach time and
//! never re-read from the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::snapshot::OrderSnapshot;
use super::status::ItemStatus;
use crate::models::order_addon::AddOnPricingMode;
use crate::models::discount::{DiscountKind, DiscountTarget};

// ============================================================================
// Order Type
// ============================================================================

/// Kind of customer transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
    Delivery,
    Banquet,
    Scheduled,
}

// ============================================================================
// Item Types
// ============================================================================

/// Additive attached to an item, price frozen at attach time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditiveSnapshot {
    pub id: i64,
    pub name: String,
    /// Frozen price in minor currency units
    pub price: i64,
}

/// One product line within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemSnapshot {
    /// Instance ID, unique within the order
    pub instance_id: String,
    pub product_id: i64,
    /// Product name snapshot
    pub name: String,
    /// Frozen unit price in minor currency units
    pub unit_price: i64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additives: Vec<AdditiveSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: ItemStatus,
    /// Set when the item was added after other items left Created
    #[serde(default)]
    pub is_reordered: bool,
    /// Computed: (unit_price + Σ additive prices) × quantity, 0 when voided
    #[serde(default)]
    pub line_total: i64,

    // === Status stamps ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<i64>,
    /// Reason recorded for the last terminal/refund transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_actor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_actor_name: Option<String>,
}

impl OrderItemSnapshot {
    pub fn new(
        instance_id: String,
        product_id: i64,
        name: String,
        unit_price: i64,
        quantity: i32,
    ) -> Self {
        Self {
            instance_id,
            product_id,
            name,
            unit_price,
            quantity,
            additives: Vec::new(),
            comment: None,
            status: ItemStatus::Created,
            is_reordered: false,
            line_total: 0,
            started_at: None,
            assignee_id: None,
            assignee_name: None,
            completed_at: None,
            cancelled_at: None,
            paused_at: None,
            refunded_at: None,
            status_reason: None,
            status_actor_id: None,
            status_actor_name: None,
        }
    }
}

/// Item input for creation / add-items (prices resolved by the engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additive_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Item changes as requested by a client (None = no change)
///
/// Additives are given by id; the engine resolves them to frozen prices
/// at modification time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemChangesInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Replace the additive set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additive_ids: Option<Vec<i64>>,
}

/// Item changes with resolved additive prices (None = no change)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ItemChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Replace the additive set (resolved to frozen prices by the engine)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additives: Option<Vec<AdditiveSnapshot>>,
}

/// One entry of a bulk item-status update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub instance_id: String,
    pub status: ItemStatus,
}

// ============================================================================
// Add-ons / Surcharges / Discounts
// ============================================================================

/// Add-on attach request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOnInput {
    pub addon_id: i64,
    pub quantity: i32,
}

/// Order-level add-on attachment with frozen unit price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddOnAttachment {
    pub addon_id: i64,
    pub name: String,
    pub mode: AddOnPricingMode,
    /// Frozen unit price in minor currency units
    pub unit_price: i64,
    pub quantity: i32,
    /// Computed contribution, re-derived on every recalculation for
    /// PerItem/PerPerson modes
    #[serde(default)]
    pub amount: i64,
}

/// How a surcharge value is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurchargeMode {
    /// `value` is an amount in minor currency units
    Fixed,
    /// `value` is a percentage of (items + add-ons)
    Percentage,
}

/// Surcharge input at order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurchargeInput {
    pub name: String,
    pub mode: SurchargeMode,
    pub value: Decimal,
}

/// Surcharge line on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurchargeLine {
    pub name: String,
    pub mode: SurchargeMode,
    /// Percent for Percentage mode, cents for Fixed mode
    pub value: Decimal,
    /// Computed amount in minor currency units
    #[serde(default)]
    pub amount: i64,
}

/// A discount applied to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountApplication {
    /// Catalog discount id; None for a customer's personal discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<i64>,
    pub description: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub target: DiscountTarget,
    /// Computed amount in minor currency units
    #[serde(default)]
    pub amount: i64,
}

// ============================================================================
// Payment
// ============================================================================

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Settled,
    Cancelled,
}

/// Payment record linked to an order
///
/// While pending, `amount` tracks the order total through every
/// mutation; once settled, money mutations of the order are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<i64>,
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order the command applied to (assigned by the server for creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Fully-denormalized order snapshot after the mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Box<OrderSnapshot>>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(
        command_id: String,
        order_id: Option<String>,
        order: Option<Box<OrderSnapshot>>,
    ) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            order,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            order: None,
            error: Some(error),
        }
    }

    /// Duplicate command: acknowledged without re-execution
    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            order: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    // Not found
    OrderNotFound,
    ItemNotFound,
    ProductNotFound,
    AdditiveNotFound,
    AddOnNotFound,
    DiscountNotFound,
    TableNotFound,
    // Conflict
    TableOccupied,
    TableWrongRestaurant,
    ReservationConflict,
    DuplicateOrderNumber,
    // Invalid state
    InvalidStatusTransition,
    OrderAlreadyPaid,
    ItemNotEditable,
    InvalidOperation,
    // Validation
    ValidationFailed,
    InsufficientBonusBalance,
    ProductStopListed,
    // Infrastructure
    DuplicateCommand,
    InternalError,
    StorageFull,
    StorageCorrupted,
    SystemBusy,
}
