//! Reservation collaborator (read-only)
//!
//! The reservation subsystem is outside this core, but its confirmed
//! near-term reservations are a hard constraint on table assignment: the
//! orchestrator rejects an assignment when a confirmed reservation falls
//! within ±2 hours of now.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::AppResult;

#[async_trait]
pub trait ReservationLookup: Send + Sync {
    /// Whether a confirmed reservation for the table falls inside the
    /// window (Unix milliseconds, inclusive)
    async fn has_confirmed_reservation_near(
        &self,
        table_id: i64,
        window_start: i64,
        window_end: i64,
    ) -> AppResult<bool>;
}

/// In-memory reservation book used by tests and the standalone binary
#[derive(Default)]
pub struct InMemoryReservations {
    /// (table_id, reserved_at millis)
    confirmed: RwLock<Vec<(i64, i64)>>,
}

impl InMemoryReservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_confirmed(&self, table_id: i64, reserved_at: i64) {
        self.confirmed.write().push((table_id, reserved_at));
    }
}

#[async_trait]
impl ReservationLookup for InMemoryReservations {
    async fn has_confirmed_reservation_near(
        &self,
        table_id: i64,
        window_start: i64,
        window_end: i64,
    ) -> AppResult<bool> {
        Ok(self
            .confirmed
            .read()
            .iter()
            .any(|(tid, at)| *tid == table_id && *at >= window_start && *at <= window_end))
    }
}
