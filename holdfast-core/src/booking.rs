use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A seat reservation moving through the hold -> payment lifecycle.
///
/// `total_cost` is fixed at creation from the inventory quote and never
/// recomputed, even if the upstream fare changes. `created_at` anchors the
/// payment window and must not be touched after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub seats: i32,
    pub total_cost: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Initiated,
    Pending,
    Booked,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Initiated => "INITIATED",
            BookingStatus::Pending => "PENDING",
            BookingStatus::Booked => "BOOKED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Both `Booked` and `Canceled` are final: nothing moves out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Booked | BookingStatus::Canceled)
    }

    /// Legal edges of the status graph. Transitions only move forward;
    /// a booking never re-enters an earlier state.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Initiated, Pending) => true,
            (Initiated, Booked) | (Pending, Booked) => true,
            (Initiated, Canceled) | (Pending, Canceled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown booking status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIATED" => Ok(BookingStatus::Initiated),
            "PENDING" => Ok(BookingStatus::Pending),
            "BOOKED" => Ok(BookingStatus::Booked),
            "CANCELED" => Ok(BookingStatus::Canceled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Incoming request to open a hold.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub seats: i32,
}

/// Fully priced draft handed to the ledger for insertion.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub seats: i32,
    pub total_cost: i32,
}

/// Policy knobs for the lifecycle engine.
#[derive(Debug, Clone, Copy)]
pub struct BookingRules {
    /// How long an unpaid hold stays claimable after creation.
    pub payment_window: Duration,
}

impl BookingRules {
    pub fn from_seconds(payment_window_seconds: i64) -> Self {
        Self {
            payment_window: Duration::seconds(payment_window_seconds),
        }
    }

    pub fn expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(created_at) > self.payment_window
    }
}

impl Default for BookingRules {
    fn default() -> Self {
        Self::from_seconds(300)
    }
}
