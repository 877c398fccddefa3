use holdfast_core::{
    Booking, BookingError, BookingRules, BookingStatus, CreateBooking, InventoryApi, Ledger,
    NewBooking,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Coordinates the booking saga: every state change pairs a local
/// transaction with a remote inventory call and compensates when the remote
/// leg fails. All mutations of a booking load its row for update first, so
/// concurrent payment and expiry on the same id serialize instead of racing.
pub struct BookingService<L: Ledger> {
    ledger: L,
    inventory: Arc<dyn InventoryApi>,
    rules: BookingRules,
}

enum ConfirmOutcome {
    Booked(Booking),
    /// The hold outlived the payment window; it was canceled and its seats
    /// released inside the same transaction.
    Lapsed,
}

impl<L: Ledger> BookingService<L> {
    pub fn new(ledger: L, inventory: Arc<dyn InventoryApi>, rules: BookingRules) -> Self {
        Self {
            ledger,
            inventory,
            rules,
        }
    }

    pub(crate) fn ledger(&self) -> &L {
        &self.ledger
    }

    pub(crate) fn rules(&self) -> &BookingRules {
        &self.rules
    }

    /// Open a hold: quote the flight, price the booking, stage the row, then
    /// decrement remote inventory. The row is only durable if the decrement
    /// succeeded; a decrement that is never committed locally is the accepted
    /// residual risk of this ordering.
    pub async fn create_booking(&self, req: CreateBooking) -> Result<Booking, BookingError> {
        if req.seats < 1 {
            return Err(BookingError::InvalidSeatCount(req.seats));
        }

        let quote = self.inventory.quote(req.flight_id).await?;
        if req.seats > quote.total_seats {
            return Err(BookingError::SeatsUnavailable {
                requested: req.seats,
                available: quote.total_seats,
            });
        }

        let draft = NewBooking {
            flight_id: req.flight_id,
            user_id: req.user_id,
            seats: req.seats,
            total_cost: req.seats * quote.price,
        };

        let mut tx = self.ledger.begin().await?;
        let booking = match self.ledger.create(&mut tx, draft).await {
            Ok(booking) => booking,
            Err(e) => {
                self.abort(tx).await;
                return Err(e);
            }
        };

        if let Err(e) = self.inventory.reserve(req.flight_id, req.seats).await {
            // The staged row must not survive a failed decrement.
            self.abort(tx).await;
            return Err(e);
        }

        self.ledger.commit(tx).await?;
        info!(booking_id = %booking.id, flight_id = %booking.flight_id, seats = booking.seats, "booking hold created");
        Ok(booking)
    }

    /// Settle payment for a hold. The only path into `Booked`. A hold past
    /// the payment window is canceled and compensated here rather than
    /// waiting for the sweeper.
    pub async fn confirm_payment(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        amount: i32,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.ledger.begin().await?;

        match self.apply_confirm(&mut tx, booking_id, user_id, amount).await {
            Ok(ConfirmOutcome::Booked(booking)) => {
                self.ledger.commit(tx).await?;
                info!(%booking_id, "payment confirmed, booking booked");
                Ok(booking)
            }
            Ok(ConfirmOutcome::Lapsed) => {
                // The cancellation and the seat release must stick.
                self.ledger.commit(tx).await?;
                info!(%booking_id, "hold expired at payment time, canceled");
                Err(BookingError::Expired)
            }
            Err(e) => {
                self.abort(tx).await;
                Err(e)
            }
        }
    }

    async fn apply_confirm(
        &self,
        tx: &mut L::Tx,
        booking_id: Uuid,
        user_id: Uuid,
        amount: i32,
    ) -> Result<ConfirmOutcome, BookingError> {
        let booking = self.ledger.get_for_update(tx, booking_id).await?;

        match booking.status {
            BookingStatus::Canceled => return Err(BookingError::AlreadyCanceled),
            BookingStatus::Booked => {
                // A concurrent confirmation already won.
                return Err(BookingError::InvalidTransition {
                    from: BookingStatus::Booked,
                    to: BookingStatus::Booked,
                });
            }
            BookingStatus::Initiated | BookingStatus::Pending => {}
        }

        if self.rules.expired(booking.created_at, chrono::Utc::now()) {
            self.ledger
                .update_status(tx, booking_id, BookingStatus::Canceled)
                .await?;
            // Holding the row lock means no other path has released yet.
            self.inventory
                .release(booking.flight_id, booking.seats)
                .await?;
            return Ok(ConfirmOutcome::Lapsed);
        }

        if booking.total_cost != amount {
            return Err(BookingError::AmountMismatch {
                expected: booking.total_cost,
                presented: amount,
            });
        }
        if booking.user_id != user_id {
            return Err(BookingError::OwnershipMismatch);
        }

        self.ledger
            .update_status(tx, booking_id, BookingStatus::Booked)
            .await?;

        Ok(ConfirmOutcome::Booked(Booking {
            status: BookingStatus::Booked,
            ..booking
        }))
    }

    /// Cancel a hold and give its seats back. Canceling an already-canceled
    /// booking is a success and performs no second release; canceling a paid
    /// booking is refused.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let mut tx = self.ledger.begin().await?;

        match self.apply_cancel(&mut tx, booking_id).await {
            Ok(booking) => {
                self.ledger.commit(tx).await?;
                Ok(booking)
            }
            Err(e) => {
                self.abort(tx).await;
                Err(e)
            }
        }
    }

    async fn apply_cancel(&self, tx: &mut L::Tx, booking_id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.ledger.get_for_update(tx, booking_id).await?;

        match booking.status {
            BookingStatus::Canceled => Ok(booking),
            BookingStatus::Booked => Err(BookingError::InvalidTransition {
                from: BookingStatus::Booked,
                to: BookingStatus::Canceled,
            }),
            BookingStatus::Initiated | BookingStatus::Pending => {
                // Release first: if the remote credit fails, the rollback
                // leaves the hold intact for the next sweep.
                self.inventory
                    .release(booking.flight_id, booking.seats)
                    .await?;
                self.ledger
                    .update_status(tx, booking_id, BookingStatus::Canceled)
                    .await?;
                info!(%booking_id, seats = booking.seats, "booking canceled, seats released");
                Ok(Booking {
                    status: BookingStatus::Canceled,
                    ..booking
                })
            }
        }
    }

    async fn abort(&self, tx: L::Tx) {
        if let Err(e) = self.ledger.rollback(tx).await {
            warn!(error = %e, "failed to roll back booking transaction");
        }
    }
}
