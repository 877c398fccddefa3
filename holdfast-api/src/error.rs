use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use holdfast_core::BookingError;
use serde_json::json;

/// Maps the core error taxonomy onto HTTP responses. Storage detail is
/// logged server-side and never leaked to the caller.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            BookingError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            BookingError::SeatsUnavailable { .. }
            | BookingError::InvalidSeatCount(_)
            | BookingError::AmountMismatch { .. }
            | BookingError::Expired
            | BookingError::AlreadyCanceled => (StatusCode::BAD_REQUEST, self.0.to_string()),
            BookingError::OwnershipMismatch => (StatusCode::FORBIDDEN, self.0.to_string()),
            BookingError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.0.to_string()),
            BookingError::RemoteUnavailable(_) | BookingError::RemoteRejected { .. } => {
                tracing::error!("Inventory service failure: {}", self.0);
                (
                    StatusCode::BAD_GATEWAY,
                    "Inventory service unavailable".to_string(),
                )
            }
            BookingError::Storage(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: BookingError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_distinct_status_codes() {
        assert_eq!(
            status_of(BookingError::NotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BookingError::SeatsUnavailable {
                requested: 5,
                available: 2
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(BookingError::Expired), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(BookingError::AlreadyCanceled),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::OwnershipMismatch),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(BookingError::InvalidTransition {
                from: holdfast_core::BookingStatus::Booked,
                to: holdfast_core::BookingStatus::Canceled,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BookingError::RemoteUnavailable("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(BookingError::Storage("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
