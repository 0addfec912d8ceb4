//! Catalog product models
//!
//! These are read-side snapshots as resolved by the catalog collaborator
//! for one restaurant. Prices are in minor currency units (cents).

use serde::{Deserialize, Serialize};

/// Product as resolved for a specific restaurant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Restaurant-specific price in minor currency units
    pub price: i64,
    /// Whether the product is on the restaurant's stop list
    pub is_stop_listed: bool,
}

/// Additive (topping/extra) attachable to an order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Additive {
    pub id: i64,
    pub name: String,
    /// Price in minor currency units
    pub price: i64,
}
