//! Loyalty collaborator
//!
//! Bonus-point ledger and personal-discount storage live outside the
//! core. Redemptions spend through this interface (1 point = 1 minor
//! currency unit) and cancellations re-credit through it.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{AppError, AppResult};
use std::collections::HashMap;
use thiserror::Error;

/// Personal discount attached to a customer at one restaurant
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalDiscount {
    /// Percent (0-100)
    pub percentage: Decimal,
    pub active: bool,
}

/// Loyalty spend failures
#[derive(Debug, Error)]
pub enum LoyaltyError {
    #[error("Insufficient bonus balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: i64 },

    #[error("Loyalty service unavailable: {0}")]
    Unavailable(String),
}

/// Loyalty-point ledger and personal-discount lookup
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    async fn personal_discount(
        &self,
        customer_id: i64,
        restaurant_id: i64,
    ) -> AppResult<Option<PersonalDiscount>>;

    async fn bonus_balance(&self, customer_id: i64, network_id: i64) -> AppResult<i64>;

    /// Spend points against an order; returns the new balance
    async fn spend_bonus_points(
        &self,
        customer_id: i64,
        network_id: i64,
        amount: i64,
        order_id: &str,
        description: &str,
    ) -> Result<i64, LoyaltyError>;

    /// Credit points back (redemption cancelled, compensation); returns
    /// the new balance
    async fn earn_bonus_points(
        &self,
        customer_id: i64,
        network_id: i64,
        amount: i64,
        order_id: &str,
        description: &str,
    ) -> AppResult<i64>;
}

/// In-memory loyalty ledger used by tests and the standalone binary
#[derive(Default)]
pub struct InMemoryLoyalty {
    /// (customer_id, network_id) -> balance
    balances: RwLock<HashMap<(i64, i64), i64>>,
    /// (customer_id, restaurant_id) -> personal discount
    personal: RwLock<HashMap<(i64, i64), PersonalDiscount>>,
}

impl InMemoryLoyalty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, customer_id: i64, network_id: i64, balance: i64) {
        self.balances
            .write()
            .insert((customer_id, network_id), balance);
    }

    pub fn balance(&self, customer_id: i64, network_id: i64) -> i64 {
        self.balances
            .read()
            .get(&(customer_id, network_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_personal_discount(
        &self,
        customer_id: i64,
        restaurant_id: i64,
        discount: PersonalDiscount,
    ) {
        self.personal
            .write()
            .insert((customer_id, restaurant_id), discount);
    }
}

#[async_trait]
impl LoyaltyService for InMemoryLoyalty {
    async fn personal_discount(
        &self,
        customer_id: i64,
        restaurant_id: i64,
    ) -> AppResult<Option<PersonalDiscount>> {
        Ok(self
            .personal
            .read()
            .get(&(customer_id, restaurant_id))
            .cloned())
    }

    async fn bonus_balance(&self, customer_id: i64, network_id: i64) -> AppResult<i64> {
        Ok(self.balance(customer_id, network_id))
    }

    async fn spend_bonus_points(
        &self,
        customer_id: i64,
        network_id: i64,
        amount: i64,
        _order_id: &str,
        _description: &str,
    ) -> Result<i64, LoyaltyError> {
        let mut balances = self.balances.write();
        let balance = balances.entry((customer_id, network_id)).or_insert(0);
        if *balance < amount {
            return Err(LoyaltyError::InsufficientBalance {
                balance: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn earn_bonus_points(
        &self,
        customer_id: i64,
        network_id: i64,
        amount: i64,
        _order_id: &str,
        _description: &str,
    ) -> AppResult<i64> {
        if amount < 0 {
            return Err(AppError::validation("amount must be non-negative"));
        }
        let mut balances = self.balances.write();
        let balance = balances.entry((customer_id, network_id)).or_insert(0);
        *balance += amount;
        Ok(*balance)
    }
}
