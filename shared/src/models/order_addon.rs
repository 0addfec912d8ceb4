//! Order-level add-on definitions
//!
//! An order add-on is a reusable priced extra (service fee, utensils,
//! banquet service) attachable to an order rather than to a product.

use serde::{Deserialize, Serialize};

/// How an order add-on contributes to the total
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddOnPricingMode {
    /// Flat fee: unit price × attach quantity
    Fixed,
    /// Per line item: unit price × attach quantity × total item quantity
    PerItem,
    /// Per guest: unit price × attach quantity × party size
    PerPerson,
}

/// Order add-on definition from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderAddOnDef {
    pub id: i64,
    pub name: String,
    pub mode: AddOnPricingMode,
    /// Unit price in minor currency units
    pub price: i64,
}
