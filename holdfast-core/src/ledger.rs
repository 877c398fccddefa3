use crate::booking::{Booking, BookingStatus, NewBooking};
use crate::error::BookingError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Durable, transactional record of bookings.
///
/// The lifecycle engine owns the transaction boundary: it begins a
/// transaction, reads and writes through it, then commits or rolls back
/// depending on how the remote leg of the saga went. `get_for_update` must
/// lock the row so concurrent mutators of the same booking serialize instead
/// of racing; operations on different bookings proceed in parallel.
#[async_trait]
pub trait Ledger: Send + Sync {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, BookingError>;
    async fn commit(&self, tx: Self::Tx) -> Result<(), BookingError>;
    async fn rollback(&self, tx: Self::Tx) -> Result<(), BookingError>;

    /// Insert a new hold with status `Initiated` inside the caller's
    /// transaction, so it can be rolled back with the rest of the saga step.
    async fn create(&self, tx: &mut Self::Tx, draft: NewBooking) -> Result<Booking, BookingError>;

    /// Fetch a booking and lock its row for the rest of the transaction.
    async fn get_for_update(&self, tx: &mut Self::Tx, id: Uuid) -> Result<Booking, BookingError>;

    /// Partial update of the status column; returns rows affected.
    async fn update_status(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<u64, BookingError>;

    /// Bookings created before `cutoff` that never reached `Booked`.
    /// Canceled rows may still match; the sweeper treats them as no-ops.
    async fn find_stale_unresolved(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError>;
}
