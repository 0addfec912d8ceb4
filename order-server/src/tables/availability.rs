//! Table availability checks and occupancy toggling
//!
//! Both functions run inside the orchestrator's write transaction, so a
//! failed command rolls the occupancy write back together with
//! everything else, and two concurrent assignments of the same table
//! serialize at the storage layer - the loser re-runs the full check and
//! observes the occupied state.
//!
//! Confirmed-reservation conflicts (±2h window) are checked by the
//! orchestrator against the reservation collaborator before the
//! transaction begins; this module only owns the occupancy state.

use redb::WriteTransaction;
use shared::models::{DiningTable, TableStatus};

use crate::orders::storage::OrderStorage;
use crate::orders::traits::OrderError;

/// Check that a table can be taken by `order_id` and mark it occupied.
///
/// Fails without side effects when the table does not exist, belongs to
/// a different restaurant, is out of service, or is held by another
/// non-terminal order.
pub fn check_and_reserve(
    storage: &OrderStorage,
    txn: &WriteTransaction,
    table_id: i64,
    restaurant_id: i64,
    order_id: &str,
) -> Result<DiningTable, OrderError> {
    let mut table = storage
        .get_table_txn(txn, table_id)
        .map_err(|e| OrderError::Storage(e.to_string()))?
        .ok_or(OrderError::TableNotFound(table_id))?;

    if table.restaurant_id != restaurant_id {
        return Err(OrderError::TableWrongRestaurant(table_id));
    }
    if !table.is_assignable() {
        return Err(OrderError::InvalidOperation(format!(
            "Table {} is not in service",
            table.name
        )));
    }
    if let Some(holder) = storage
        .find_active_order_for_table_txn(txn, table_id, Some(order_id))
        .map_err(|e| OrderError::Storage(e.to_string()))?
    {
        return Err(OrderError::TableOccupied(format!(
            "Table {} is already occupied (order: {})",
            table.name, holder
        )));
    }

    table.status = TableStatus::Occupied;
    storage
        .put_table_txn(txn, &table)
        .map_err(|e| OrderError::Storage(e.to_string()))?;
    Ok(table)
}

/// Release a table held by `order_id`.
///
/// The table reverts to Available only if no other non-terminal order
/// references it; otherwise this is a no-op.
pub fn release(
    storage: &OrderStorage,
    txn: &WriteTransaction,
    table_id: i64,
    order_id: &str,
) -> Result<(), OrderError> {
    let Some(mut table) = storage
        .get_table_txn(txn, table_id)
        .map_err(|e| OrderError::Storage(e.to_string()))?
    else {
        tracing::warn!(table_id, "Release requested for unknown table");
        return Ok(());
    };

    let other_holder = storage
        .find_active_order_for_table_txn(txn, table_id, Some(order_id))
        .map_err(|e| OrderError::Storage(e.to_string()))?;
    if other_holder.is_some() {
        return Ok(());
    }

    if table.status == TableStatus::Occupied {
        table.status = TableStatus::Available;
        storage
            .put_table_txn(txn, &table)
            .map_err(|e| OrderError::Storage(e.to_string()))?;
    }
    Ok(())
}
