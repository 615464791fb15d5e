//! Booking lifecycle handlers.

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use gout_core::error::AppError;
use gout_core::types::BookingId;

use crate::dto::request::{ConfirmPaymentRequest, ReserveRequest};
use crate::dto::response::{
    ApiResponse, BookingResponse, CredentialResponse, ReservationResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/bookings
pub async fn reserve(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<ApiResponse<ReservationResponse>>, ApiError> {
    let reserved = state.bookings.reserve(auth.context(), req.trip_id).await?;

    Ok(Json(ApiResponse::ok(ReservationResponse {
        booking: reserved.booking.into(),
        credential: reserved.credential,
    })))
}

/// GET /api/bookings/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking = state.bookings.get(auth.context(), id).await?;
    Ok(Json(ApiResponse::ok(booking.into())))
}

/// POST /api/bookings/{id}/payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let booking = state
        .bookings
        .confirm_payment(auth.context(), id, &req.payment_ref)
        .await?;

    Ok(Json(ApiResponse::ok(booking.into())))
}

/// POST /api/bookings/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking = state.bookings.cancel(auth.context(), id).await?;
    Ok(Json(ApiResponse::ok(booking.into())))
}

/// GET /api/bookings/{id}/credential
pub async fn credential(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> Result<Json<ApiResponse<CredentialResponse>>, ApiError> {
    let credential = state.bookings.credential(auth.context(), id).await?;

    Ok(Json(ApiResponse::ok(CredentialResponse {
        booking_id: id,
        credential,
    })))
}
