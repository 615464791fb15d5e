//! Request context carrying the verified subject and role.

use serde::{Deserialize, Serialize};

use gout_core::error::AppError;
use gout_core::types::MemberId;
use gout_entity::member::MemberRole;

/// Context for the current authenticated request.
///
/// Built by the transport layer from verified token claims and passed into
/// every service method so each operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The authenticated account's ID.
    pub member_id: MemberId,
    /// The role at the time the token was issued.
    pub role: MemberRole,
    /// Login email (convenience field from claims).
    pub email: String,
}

impl AuthContext {
    /// Creates a new auth context.
    pub fn new(member_id: MemberId, role: MemberRole, email: String) -> Self {
        Self {
            member_id,
            role,
            email,
        }
    }

    /// Returns whether the caller is staff.
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Requires the staff capability.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::forbidden("Staff role required"))
        }
    }

    /// Requires that the caller owns the resource or is staff.
    pub fn require_owner_or_staff(&self, owner: MemberId) -> Result<(), AppError> {
        if self.member_id == owner || self.is_staff() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Only the owning member or staff may act on this booking",
            ))
        }
    }
}
