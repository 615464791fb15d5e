//! Auth handlers — register, login, me.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use validator::Validate;

use gout_core::error::AppError;
use gout_core::types::MemberId;
use gout_entity::member::{Member, MemberRole};

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MemberResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MemberResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let member = Member {
        id: MemberId::new(),
        email: req.email.to_lowercase(),
        first_name: req.first_name,
        last_name: req.last_name,
        password_hash,
        role: MemberRole::Member,
        created_at: Utc::now(),
    };

    let created = state.members.create(&member).await?;

    tracing::info!(member_id = %created.id, "member registered");
    Ok(Json(ApiResponse::ok(created.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let member = state
        .members
        .find_by_email(&req.email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::unauthenticated("Invalid email or password"))?;

    let ok = state
        .password_hasher
        .verify_password(&req.password, &member.password_hash)?;
    if !ok {
        return Err(AppError::unauthenticated("Invalid email or password").into());
    }

    let access_token = state
        .token_issuer
        .issue(member.id, member.role, &member.email)?;

    tracing::info!(member_id = %member.id, "member logged in");
    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token,
        expires_in_minutes: state.config.auth.jwt_ttl_minutes,
        member: member.into(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MemberResponse>>, ApiError> {
    let member = state
        .members
        .find_by_id(auth.member_id)
        .await?
        .ok_or_else(|| AppError::not_found("Member account no longer exists"))?;

    Ok(Json(ApiResponse::ok(member.into())))
}
