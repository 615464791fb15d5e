//! Trip entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gout_core::types::TripId;

/// A published trip.
///
/// Trips are owned by the external catalog; the booking engine reads only
/// the departure time and capacity. Capacity changes after publication are
/// out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    /// Unique trip identifier.
    pub id: TripId,
    /// Display title.
    pub title: String,
    /// Scheduled departure time.
    pub departure_at: DateTime<Utc>,
    /// Total seat capacity.
    pub capacity: i32,
    /// Seats currently held by non-terminal bookings.
    pub seats_held: i32,
}

impl Trip {
    /// Whether the trip has already departed at `now`.
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        now >= self.departure_at
    }
}
