//! Order engine types
//!
//! - Commands: requests from clients to mutate orders
//! - Events: immutable facts recorded after command processing
//! - Snapshots: computed order state from the event stream
//! - Status: the order/item state machines as lookup tables

pub mod command;
pub mod event;
pub mod snapshot;
pub mod status;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use snapshot::OrderSnapshot;
pub use status::{derive_order_status, ItemStatus, OrderStatus};
pub use types::*;
