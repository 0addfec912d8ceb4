//! Core traits for command processing and event application
//!
//! Commands are validated and turned into events by [`CommandHandler`]
//! implementations; events are folded into snapshots by pure
//! [`EventApplier`] implementations. [`CommandContext`] gives handlers
//! access to the current write transaction, a per-command snapshot cache
//! and the global sequence counter.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::order::status::{ItemStatus, OrderStatus};
use shared::order::{OrderEvent, OrderSnapshot};
use std::collections::HashMap;
use thiserror::Error;

use super::appliers::*;
use super::storage::OrderStorage;

/// Metadata extracted from the command envelope
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Per-command execution context
///
/// Snapshots loaded through the context are cached so that an action and
/// the subsequent appliers observe each other's writes within the same
/// transaction.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sequence: u64,
    snapshots: HashMap<String, OrderSnapshot>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            snapshots: HashMap::new(),
        }
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Highest sequence allocated so far
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn txn(&self) -> &'a WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &'a OrderStorage {
        self.storage
    }

    /// Load a snapshot, preferring uncommitted writes from this command
    pub fn load_snapshot(&mut self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.snapshots.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Stage an updated snapshot for persistence at commit
    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.snapshots.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Snapshots modified during this command
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.snapshots.values()
    }
}

/// Command handler - validates and emits events, never mutates snapshots
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier - pure fold of one event into a snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}

/// Errors surfaced by command validation
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Product {0} is stop-listed for this restaurant")]
    ProductStopListed(i64),

    #[error("Additive not found: {0}")]
    AdditiveNotFound(i64),

    #[error("Order add-on not found: {0}")]
    AddOnNotFound(i64),

    #[error("Discount not found: {0}")]
    DiscountNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Table is occupied: {0}")]
    TableOccupied(String),

    #[error("Table belongs to a different restaurant: {0}")]
    TableWrongRestaurant(i64),

    #[error("Invalid order status transition: {from:?} -> {to:?}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid item status transition: {from:?} -> {to:?}")]
    InvalidItemTransition { from: ItemStatus, to: ItemStatus },

    #[error("Order payment already settled: {0}")]
    OrderAlreadyPaid(String),

    #[error("Item is not editable: {0}")]
    ItemNotEditable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient bonus balance: have {balance}, requested {requested}")]
    InsufficientBonusBalance { balance: i64, requested: i64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
