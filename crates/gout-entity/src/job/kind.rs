//! Job kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of scheduled background work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Expire a booking whose reservation or payment deadline lapsed.
    ExpireSweep,
    /// Enqueue a departure reminder for a confirmed booking.
    Reminder,
    /// Re-attempt payment confirmation for a recorded payment reference.
    ReconcilePayment,
}

impl JobKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpireSweep => "expire_sweep",
            Self::Reminder => "reminder",
            Self::ReconcilePayment => "reconcile_payment",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
