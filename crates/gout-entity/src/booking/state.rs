//! Booking lifecycle state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a booking.
///
/// Success path: `Reserved → AwaitingPayment → Confirmed → CheckedIn`.
/// `Expired` and `Cancelled` are terminal failure states reachable from
/// every non-terminal state before check-in. No transition leaves a
/// terminal state; terminal bookings are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Seat held, payment not yet initiated.
    Reserved,
    /// Payment initiated, confirmation pending.
    AwaitingPayment,
    /// Payment confirmed; credential valid for boarding.
    Confirmed,
    /// Credential accepted at boarding.
    CheckedIn,
    /// Deadline lapsed before the booking progressed.
    Expired,
    /// Cancelled by the owning member or staff.
    Cancelled,
}

impl BookingState {
    /// Check whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CheckedIn | Self::Expired | Self::Cancelled)
    }

    /// Whether a booking in this state occupies a seat against the trip
    /// capacity. Computed from the state so that seat accounting can never
    /// desync from the lifecycle: a hold is released exactly when a
    /// transition crosses from a holding state to a non-holding one.
    pub fn holds_seat(&self) -> bool {
        matches!(
            self,
            Self::Reserved | Self::AwaitingPayment | Self::Confirmed | Self::CheckedIn
        )
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = gout_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" => Ok(Self::CheckedIn),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(gout_core::AppError::validation(format!(
                "Invalid booking state: '{s}'"
            ))),
        }
    }
}
