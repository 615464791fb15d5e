//! JWT claims structure embedded in bearer tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gout_core::types::MemberId;
use gout_entity::member::MemberRole;

/// Claims payload embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the member ID.
    pub sub: MemberId,
    /// Role at the time of token issuance.
    pub role: MemberRole,
    /// Login email for convenience.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the member ID from the subject claim.
    pub fn member_id(&self) -> MemberId {
        self.sub
    }
}
