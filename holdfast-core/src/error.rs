use crate::booking::BookingStatus;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the booking lifecycle.
///
/// Every variant maps to a distinct caller-facing outcome; nothing here is
/// swallowed except the documented idempotent no-ops (re-canceling an
/// already-canceled booking).
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("not enough seats on flight: requested {requested}, {available} available")]
    SeatsUnavailable { requested: i32, available: i32 },

    #[error("seat count must be positive, got {0}")]
    InvalidSeatCount(i32),

    #[error("payment amount {presented} does not match booking total {expected}")]
    AmountMismatch { expected: i32, presented: i32 },

    #[error("booking does not belong to the paying user")]
    OwnershipMismatch,

    #[error("the booking hold has expired")]
    Expired,

    #[error("the booking is already canceled")]
    AlreadyCanceled,

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("inventory service unreachable: {0}")]
    RemoteUnavailable(String),

    #[error("inventory service rejected the call (status {status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("storage failure: {0}")]
    Storage(String),
}
