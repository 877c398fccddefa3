use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use holdfast_core::{Booking, CreateBooking};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub user_id: Uuid,
    pub total_cost: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}/payments", post(confirm_payment))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBooking>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state.bookings.create_booking(req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .bookings
        .confirm_payment(id, req.user_id, req.total_cost)
        .await?;
    Ok(Json(booking))
}
