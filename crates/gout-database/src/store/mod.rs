//! The relational-store collaborator interface.
//!
//! Every booking mutation goes through [`BookingStore::compare_and_swap_state`]:
//! a single conditional update keyed on the current state column, which acts
//! as the optimistic concurrency token. Seat-hold release is part of the same
//! atomic commit, so a hold can never be released twice or outside a
//! committed transition.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gout_core::result::AppResult;
use gout_core::types::{BookingId, JobId, MemberId, TripId};
use gout_entity::booking::{Booking, BookingState};
use gout_entity::job::Job;
use gout_entity::member::Member;
use gout_entity::trip::Trip;

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

/// The write half of a compare-and-swap commit.
#[derive(Debug, Clone)]
pub struct StateUpdate {
    /// State the booking moves to.
    pub new_state: BookingState,
    /// State-entry timestamp for the new state.
    pub entered_at: DateTime<Utc>,
    /// Fresh credential nonce, when the transition mints one.
    pub new_nonce: Option<Uuid>,
    /// Payment reference, when the transition records one.
    pub payment_ref: Option<String>,
    /// Whether the commit releases the booking's seat hold. Derived by the
    /// caller from `from.holds_seat() && !to.holds_seat()`, never stored.
    pub release_seat: bool,
}

/// Storage collaborator for bookings, trips, members, and jobs.
///
/// Implementations must make each method atomic with respect to concurrent
/// callers; the engine runs as multiple server processes sharing one store,
/// so in-process locks are never assumed sufficient by callers.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Load a booking by ID.
    async fn load_booking(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Find the non-terminal booking for a (trip, member) pair, if any.
    async fn find_active_booking(
        &self,
        trip_id: TripId,
        member_id: MemberId,
    ) -> AppResult<Option<Booking>>;

    /// Insert a freshly reserved booking.
    ///
    /// Fails with `DuplicateBooking` if a non-terminal booking already
    /// exists for the same (trip, member) pair.
    async fn insert_booking(&self, booking: &Booking) -> AppResult<()>;

    /// Atomically commit a state transition.
    ///
    /// The update applies only if the persisted state still equals
    /// `expected`; otherwise the call fails with `StaleState` and nothing
    /// is written. Seat-hold release requested by the update happens in the
    /// same atomic commit.
    async fn compare_and_swap_state(
        &self,
        id: BookingId,
        expected: BookingState,
        update: StateUpdate,
    ) -> AppResult<Booking>;

    /// Atomically take one seat hold on a trip.
    ///
    /// Fails with `CapacityExceeded` when the trip is full and `NotFound`
    /// for an unknown trip.
    async fn increment_seat_hold(&self, trip_id: TripId) -> AppResult<()>;

    /// Give back one seat hold (allocator rollback path only; transition
    /// commits release through `compare_and_swap_state`).
    async fn decrement_seat_hold(&self, trip_id: TripId) -> AppResult<()>;

    /// Load a trip by ID.
    async fn load_trip(&self, id: TripId) -> AppResult<Option<Trip>>;

    /// Load a member by ID.
    async fn load_member(&self, id: MemberId) -> AppResult<Option<Member>>;

    /// Enqueue a job. Returns `false` when a job with the same idempotency
    /// key already exists (the insert is a no-op).
    async fn insert_job(&self, job: &Job) -> AppResult<bool>;

    /// Select unconsumed jobs whose earliest-execution time has passed.
    async fn select_due_jobs(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Job>>;

    /// Mark a job as consumed in logical effect.
    async fn mark_job_consumed(&self, id: JobId) -> AppResult<()>;
}
