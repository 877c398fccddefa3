pub mod booking;
pub mod error;
pub mod inventory;
pub mod ledger;

pub use booking::{Booking, BookingRules, BookingStatus, CreateBooking, NewBooking};
pub use error::BookingError;
pub use inventory::{FlightQuote, InventoryApi};
pub use ledger::Ledger;
