//! Check-in scan handler.

use axum::extract::State;
use axum::Json;
use validator::Validate;

use gout_core::error::AppError;

use crate::dto::request::CheckInRequest;
use crate::dto::response::{ApiResponse, CheckInResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/checkin
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<ApiResponse<CheckInResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let summary = state
        .checkin
        .check_in(auth.context(), &req.credential)
        .await?;

    Ok(Json(ApiResponse::ok(summary.into())))
}
