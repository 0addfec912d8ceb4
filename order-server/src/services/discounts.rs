//! Discount store collaborator
//!
//! Discount/promo definitions live outside the core; the engine reads
//! them here and maintains each definition's usage counter symmetrically
//! on apply and remove.

use parking_lot::RwLock;
use shared::models::Discount;
use std::collections::HashMap;

/// Discount definitions with usage tracking
pub trait DiscountStore: Send + Sync {
    fn get(&self, id: i64) -> Option<Discount>;

    /// Called after a discount application commits
    fn increment_usage(&self, id: i64);

    /// Called after a discount removal commits; must undo one increment
    fn decrement_usage(&self, id: i64);
}

/// In-memory discount store used by tests and the standalone binary
#[derive(Default)]
pub struct InMemoryDiscounts {
    discounts: RwLock<HashMap<i64, Discount>>,
}

impl InMemoryDiscounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, discount: Discount) {
        self.discounts.write().insert(discount.id, discount);
    }

    pub fn usage_count(&self, id: i64) -> Option<u32> {
        self.discounts.read().get(&id).map(|d| d.usage_count)
    }
}

impl DiscountStore for InMemoryDiscounts {
    fn get(&self, id: i64) -> Option<Discount> {
        self.discounts.read().get(&id).cloned()
    }

    fn increment_usage(&self, id: i64) {
        if let Some(discount) = self.discounts.write().get_mut(&id) {
            discount.usage_count += 1;
        }
    }

    fn decrement_usage(&self, id: i64) {
        if let Some(discount) = self.discounts.write().get_mut(&id) {
            discount.usage_count = discount.usage_count.saturating_sub(1);
        }
    }
}
