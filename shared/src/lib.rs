//! Shared types for the Comanda order engine
//!
//! Common types used across the engine and any transport adapter:
//! order commands, events and snapshots, the order/item status machines,
//! catalog and table models, the unified error system and utility types.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
