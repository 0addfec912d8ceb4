//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
///
/// The order engine is the only writer of `Available`/`Occupied`;
/// `Reserved`/`OutOfService`/`Cleaning` are managed externally and read
/// as constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    OutOfService,
    Cleaning,
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
}

impl DiningTable {
    /// Whether the table can accept a new order assignment at all
    ///
    /// Occupancy by another order is checked separately against the
    /// active-order index; this only filters out tables taken out of
    /// service.
    pub fn is_assignable(&self) -> bool {
        !matches!(self.status, TableStatus::OutOfService | TableStatus::Cleaning)
    }
}
