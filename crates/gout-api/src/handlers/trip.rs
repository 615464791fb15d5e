//! Trip read handlers.

use axum::extract::{Path, State};
use axum::Json;

use gout_core::error::AppError;
use gout_core::types::TripId;

use crate::dto::response::{ApiResponse, TripResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/trips/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<TripId>,
) -> Result<Json<ApiResponse<TripResponse>>, ApiError> {
    let trip = state
        .store
        .load_trip(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Trip {id} not found")))?;

    Ok(Json(ApiResponse::ok(trip.into())))
}
