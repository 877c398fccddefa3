use crate::error::BookingError;
use async_trait::async_trait;
use uuid::Uuid;

/// Point-in-time snapshot of a flight's sellable inventory.
#[derive(Debug, Clone, Copy)]
pub struct FlightQuote {
    pub total_seats: i32,
    pub price: i32,
}

/// Capability contract against the remote inventory (flight) service.
///
/// `reserve` and `release` are inverses under equal seat counts. Neither is
/// deduplicated here; idempotency at booking-id granularity is the lifecycle
/// engine's job. Calls are not retried internally: a remote failure is a hard
/// failure of the enclosing saga step.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn quote(&self, flight_id: Uuid) -> Result<FlightQuote, BookingError>;

    /// Decrement available seats by `seats`.
    async fn reserve(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError>;

    /// Credit `seats` back after a canceled or expired hold.
    async fn release(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError>;
}
