//! Discount / promo definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the discount value is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// `value` is a percentage (0-100)
    Percentage,
    /// `value` is an amount in minor currency units
    Fixed,
}

/// What part of the order the discount applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountTarget {
    /// The whole order total
    All,
    /// Only line items for the listed product ids
    Products { product_ids: Vec<i64> },
}

/// Discount definition with usage tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    pub id: i64,
    pub description: String,
    pub kind: DiscountKind,
    /// Percent for [`DiscountKind::Percentage`], cents for [`DiscountKind::Fixed`]
    pub value: Decimal,
    pub target: DiscountTarget,
    /// Times this discount has been applied (decremented on removal)
    pub usage_count: u32,
    pub is_active: bool,
}
