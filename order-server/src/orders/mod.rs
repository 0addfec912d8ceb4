//! Order lifecycle engine
//!
//! The order subsystem processes every mutation as one atomic unit of
//! work:
//!
//! ```text
//! Command → OrdersManager → Action (validate) → Events → Appliers
//!                 │                                         │
//!            redb txn commit ◄──────────── Snapshot update ─┘
//!                 │
//!            Broadcast (post-commit) → Notification fan-out
//! ```
//!
//! - **manager**: orchestrator sequencing validation, pricing,
//!   persistence and post-commit effects
//! - **actions**: one command handler per operation
//! - **appliers**: pure event folds into the denormalized snapshot
//! - **storage**: redb persistence (events, snapshots, indices, tables)
//! - **scheduler**: time-driven start of scheduled orders

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod scheduler;
pub mod storage;
pub mod traits;

// Re-exports
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use scheduler::ScheduledOrderWorker;
pub use storage::{OrderStorage, StorageError};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot,
};
