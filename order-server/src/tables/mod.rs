//! Seating resource (table) availability

pub mod availability;

pub use availability::{check_and_reserve, release};
