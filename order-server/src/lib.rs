//! Comanda Order Server - order lifecycle and pricing engine
//!
//! # Architecture
//!
//! - **orders**: command → action → event → applier engine over redb,
//!   with the orchestrating `OrdersManager`
//! - **pricing**: pure money computation (items, add-ons, surcharges,
//!   discounts, bonus points) in integer minor currency units
//! - **tables**: seating-resource availability and occupancy toggling
//! - **services**: collaborator interfaces (catalog, discounts, loyalty,
//!   reservations) with in-memory implementations
//! - **message**: post-commit notification dispatcher with a topic-keyed
//!   subscription registry
//! - **core**: configuration and background task management
//!
//! No transport is part of this crate; adapters sit on top of
//! [`OrdersManager::execute_command`] and the notification dispatcher.

pub mod core;
pub mod message;
pub mod orders;
pub mod pricing;
pub mod services;
pub mod tables;
pub mod utils;

// Re-export public types
pub use crate::core::{BackgroundTasks, Config, TaskKind};
pub use message::{NotificationDispatcher, NotificationKind};
pub use orders::{OrderStorage, OrdersManager, ScheduledOrderWorker};
pub use utils::{init_logger, init_logger_with_file};
