use holdfast_booking::BookingService;
use holdfast_store::PostgresLedger;
use std::sync::Arc;

pub type BookingEngine = BookingService<PostgresLedger>;

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingEngine>,
}
