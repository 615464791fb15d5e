//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use gout_core::types::{BookingId, MemberId, TripId};

use super::state::BookingState;

/// One member's claim on one seat of one trip.
///
/// A booking is created by a reservation request, mutated only through
/// state-machine transitions committed with a compare-and-swap on the
/// `state` column, and never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// The trip this booking claims a seat on.
    pub trip_id: TripId,
    /// The owning member.
    pub member_id: MemberId,
    /// Current lifecycle state — also the optimistic concurrency token.
    pub state: BookingState,
    /// Credential nonce; rotated at payment confirmation so that
    /// previously issued credentials stop verifying.
    pub nonce: Uuid,
    /// Payment reference recorded when payment is initiated.
    pub payment_ref: Option<String>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking entered its current state.
    pub state_entered_at: DateTime<Utc>,
}

impl Booking {
    /// Create a freshly reserved booking with a newly minted nonce.
    pub fn reserve(trip_id: TripId, member_id: MemberId, now: DateTime<Utc>) -> Self {
        Self {
            id: BookingId::new(),
            trip_id,
            member_id,
            state: BookingState::Reserved,
            nonce: Uuid::new_v4(),
            payment_ref: None,
            created_at: now,
            state_entered_at: now,
        }
    }

    /// Whether the booking is owned by the given member.
    pub fn is_owned_by(&self, member_id: MemberId) -> bool {
        self.member_id == member_id
    }
}
