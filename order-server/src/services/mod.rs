//! Collaborator interfaces consumed by the order engine
//!
//! Catalog, discount, loyalty and reservation data live outside this
//! core; the engine consumes them through these narrow interfaces. The
//! in-memory implementations back the binary shell and the tests.

pub mod catalog;
pub mod discounts;
pub mod loyalty;
pub mod reservations;

pub use catalog::{CatalogService, InMemoryCatalog};
pub use discounts::{DiscountStore, InMemoryDiscounts};
pub use loyalty::{InMemoryLoyalty, LoyaltyError, LoyaltyService, PersonalDiscount};
pub use reservations::{InMemoryReservations, ReservationLookup};
