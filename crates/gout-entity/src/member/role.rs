//! Member role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles recognized by the booking engine.
///
/// Members book and manage their own seats; staff validate credentials at
/// boarding and may cancel any booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// A travelling member.
    Member,
    /// Boarding/operations staff.
    Staff,
}

impl MemberRole {
    /// Check if this role is staff.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Staff)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = gout_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "staff" => Ok(Self::Staff),
            _ => Err(gout_core::AppError::validation(format!(
                "Invalid member role: '{s}'. Expected one of: member, staff"
            ))),
        }
    }
}
