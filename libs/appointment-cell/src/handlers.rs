// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, BookingConfirmation};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    let Json(request) = payload?;

    let booking_service = BookingService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.booking_locks),
    );
    let confirmation = booking_service.book(request).await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(booking_id) = booking_id?;
    let booking_service = BookingService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.booking_locks),
    );
    let booking = booking_service.get_booking(booking_id).await?;

    Ok(Json(json!({
        "booking": booking,
        "end": shared_models::time::format_display(booking.end()),
    })))
}
