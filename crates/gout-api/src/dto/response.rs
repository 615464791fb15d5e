//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gout_core::types::{BookingId, MemberId, TripId};
use gout_entity::booking::Booking;
use gout_entity::member::Member;
use gout_entity::trip::Trip;
use gout_service::checkin::CheckInSummary;
use gout_worker::SweepStats;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Member summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    /// Member ID.
    pub id: MemberId,
    /// Login email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role.
    pub role: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            email: member.email,
            first_name: member.first_name,
            last_name: member.last_name,
            role: member.role.to_string(),
            created_at: member.created_at,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token lifetime in minutes.
    pub expires_in_minutes: u64,
    /// Member info.
    pub member: MemberResponse,
}

/// Booking summary for responses.
///
/// The credential nonce is deliberately absent; it only ever leaves the
/// system inside a signed credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Booking ID.
    pub id: BookingId,
    /// Trip ID.
    pub trip_id: TripId,
    /// Owning member ID.
    pub member_id: MemberId,
    /// Current lifecycle state.
    pub state: String,
    /// Recorded payment reference, if any.
    pub payment_ref: Option<String>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// When the current state was entered.
    pub state_entered_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            trip_id: booking.trip_id,
            member_id: booking.member_id,
            state: booking.state.to_string(),
            payment_ref: booking.payment_ref,
            created_at: booking.created_at,
            state_entered_at: booking.state_entered_at,
        }
    }
}

/// Reservation response: the booking plus its check-in credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    /// The created booking.
    pub booking: BookingResponse,
    /// Signed credential payload, ready to render as a QR code.
    pub credential: String,
}

/// Credential re-issue response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialResponse {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Signed credential payload.
    pub credential: String,
}

/// Trip summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripResponse {
    /// Trip ID.
    pub id: TripId,
    /// Display title.
    pub title: String,
    /// Scheduled departure.
    pub departure_at: DateTime<Utc>,
    /// Total capacity.
    pub capacity: i32,
    /// Seats not currently held.
    pub seats_available: i32,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            title: trip.title,
            departure_at: trip.departure_at,
            capacity: trip.capacity,
            seats_available: (trip.capacity - trip.seats_held).max(0),
        }
    }
}

/// Check-in result shown to the gate agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Passenger display name.
    pub member_name: String,
    /// Trip title.
    pub trip_title: String,
    /// Departure time.
    pub departure_at: DateTime<Utc>,
}

impl From<CheckInSummary> for CheckInResponse {
    fn from(summary: CheckInSummary) -> Self {
        Self {
            booking_id: summary.booking_id,
            member_name: summary.member_name,
            trip_title: summary.trip_title,
            departure_at: summary.departure_at,
        }
    }
}

/// Outcome of a manually triggered sweep pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    /// Jobs selected as due.
    pub selected: usize,
    /// Jobs whose transition committed.
    pub applied: usize,
    /// Jobs consumed without effect.
    pub skipped: usize,
    /// Jobs left queued after a failure.
    pub failed: usize,
}

impl From<SweepStats> for SweepResponse {
    fn from(stats: SweepStats) -> Self {
        Self {
            selected: stats.selected,
            applied: stats.applied,
            skipped: stats.skipped,
            failed: stats.failed,
        }
    }
}
