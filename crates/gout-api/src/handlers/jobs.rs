//! Manual job sweep trigger.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::dto::response::{ApiResponse, SweepResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/jobs/run
///
/// Staff-only escape hatch: run one sweep pass immediately instead of
/// waiting for the scheduler interval.
pub async fn run_due(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<SweepResponse>>, ApiError> {
    auth.require_staff()?;

    let stats = state.orchestrator.run_due(Utc::now()).await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}
