//! `AuthUser` extractor — pulls the bearer token from the Authorization
//! header, verifies it, and injects the caller's context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gout_core::error::AppError;
use gout_service::context::AuthContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated member context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl AuthUser {
    /// Returns the inner `AuthContext`.
    pub fn context(&self) -> &AuthContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthenticated("Invalid Authorization header format"))?;

        let claims = state.token_verifier.verify(token)?;

        Ok(AuthUser(AuthContext::new(
            claims.sub,
            claims.role,
            claims.email,
        )))
    }
}
