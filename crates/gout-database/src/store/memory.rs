//! In-memory booking store for single-node development and tests.
//!
//! An arena of bookings keyed by identifier behind one Tokio mutex. The
//! mutex gives the same atomicity guarantees per operation that the
//! PostgreSQL implementation gets from conditional updates, so the
//! optimistic-state semantics observed by callers are identical.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use gout_core::error::AppError;
use gout_core::result::AppResult;
use gout_core::types::{BookingId, JobId, MemberId, TripId};
use gout_entity::booking::{Booking, BookingState};
use gout_entity::job::Job;
use gout_entity::member::Member;
use gout_entity::trip::Trip;

use super::{BookingStore, StateUpdate};

#[derive(Debug, Default)]
struct InnerState {
    bookings: HashMap<BookingId, Booking>,
    trips: HashMap<TripId, Trip>,
    members: HashMap<MemberId, Member>,
    jobs: HashMap<JobId, Job>,
}

impl InnerState {
    fn job_key_exists(&self, key: &str) -> bool {
        self.jobs.values().any(|j| j.idempotency_key == key)
    }
}

/// In-memory booking store.
///
/// Suitable for single-node deployments and the test suites only.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryBookingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a trip (the catalog is external; tests and dev seed directly).
    pub async fn insert_trip(&self, trip: Trip) {
        self.state.lock().await.trips.insert(trip.id, trip);
    }

    /// Seed a member account.
    pub async fn insert_member(&self, member: Member) {
        self.state.lock().await.members.insert(member.id, member);
    }

    /// Current seat-hold count for a trip (test observability).
    pub async fn seats_held(&self, trip_id: TripId) -> i32 {
        self.state
            .lock()
            .await
            .trips
            .get(&trip_id)
            .map(|t| t.seats_held)
            .unwrap_or(0)
    }

    /// Number of unconsumed jobs (test observability).
    pub async fn pending_jobs(&self) -> usize {
        self.state
            .lock()
            .await
            .jobs
            .values()
            .filter(|j| j.consumed_at.is_none())
            .count()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn load_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&id).cloned())
    }

    async fn find_active_booking(
        &self,
        trip_id: TripId,
        member_id: MemberId,
    ) -> AppResult<Option<Booking>> {
        Ok(self
            .state
            .lock()
            .await
            .bookings
            .values()
            .find(|b| {
                b.trip_id == trip_id && b.member_id == member_id && !b.state.is_terminal()
            })
            .cloned())
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let duplicate = state.bookings.values().any(|b| {
            b.trip_id == booking.trip_id
                && b.member_id == booking.member_id
                && !b.state.is_terminal()
        });
        if duplicate {
            return Err(AppError::duplicate_booking(
                "Member already holds an active booking for this trip",
            ));
        }

        state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn compare_and_swap_state(
        &self,
        id: BookingId,
        expected: BookingState,
        update: StateUpdate,
    ) -> AppResult<Booking> {
        let mut state = self.state.lock().await;

        let booking = state
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;

        if booking.state != expected {
            return Err(AppError::stale_state(format!(
                "Booking {id} is no longer in state '{expected}'"
            )));
        }

        booking.state = update.new_state;
        booking.state_entered_at = update.entered_at;
        if let Some(nonce) = update.new_nonce {
            booking.nonce = nonce;
        }
        if let Some(payment_ref) = update.payment_ref {
            booking.payment_ref = Some(payment_ref);
        }
        let committed = booking.clone();

        if update.release_seat {
            if let Some(trip) = state.trips.get_mut(&committed.trip_id) {
                trip.seats_held = (trip.seats_held - 1).max(0);
            }
        }

        Ok(committed)
    }

    async fn increment_seat_hold(&self, trip_id: TripId) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let trip = state
            .trips
            .get_mut(&trip_id)
            .ok_or_else(|| AppError::not_found(format!("Trip {trip_id} not found")))?;

        if trip.seats_held >= trip.capacity {
            return Err(AppError::capacity_exceeded(format!(
                "Trip {trip_id} has no seats left"
            )));
        }

        trip.seats_held += 1;
        Ok(())
    }

    async fn decrement_seat_hold(&self, trip_id: TripId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(trip) = state.trips.get_mut(&trip_id) {
            trip.seats_held = (trip.seats_held - 1).max(0);
        }
        Ok(())
    }

    async fn load_trip(&self, id: TripId) -> AppResult<Option<Trip>> {
        Ok(self.state.lock().await.trips.get(&id).cloned())
    }

    async fn load_member(&self, id: MemberId) -> AppResult<Option<Member>> {
        Ok(self.state.lock().await.members.get(&id).cloned())
    }

    async fn insert_job(&self, job: &Job) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.job_key_exists(&job.idempotency_key) {
            return Ok(false);
        }
        state.jobs.insert(job.id, job.clone());
        Ok(true)
    }

    async fn select_due_jobs(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Job>> {
        let state = self.state.lock().await;
        let mut due: Vec<Job> = state
            .jobs
            .values()
            .filter(|j| j.consumed_at.is_none() && j.run_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|j| j.run_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn mark_job_consumed(&self, id: JobId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(job) = state.jobs.get_mut(&id) {
            if job.consumed_at.is_none() {
                job.consumed_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gout_entity::job::JobKind;

    fn trip(capacity: i32) -> Trip {
        Trip {
            id: TripId::new(),
            title: "Khao Yai weekend".to_string(),
            departure_at: Utc::now() + chrono::Duration::days(7),
            capacity,
            seats_held: 0,
        }
    }

    #[tokio::test]
    async fn test_seat_hold_respects_capacity() {
        let store = MemoryBookingStore::new();
        let t = trip(2);
        let trip_id = t.id;
        store.insert_trip(t).await;

        store.increment_seat_hold(trip_id).await.unwrap();
        store.increment_seat_hold(trip_id).await.unwrap();
        let err = store.increment_seat_hold(trip_id).await.unwrap_err();
        assert_eq!(err.kind, gout_core::error::ErrorKind::CapacityExceeded);
    }

    #[tokio::test]
    async fn test_cas_rejects_stale_expected_state() {
        let store = MemoryBookingStore::new();
        let t = trip(1);
        let trip_id = t.id;
        store.insert_trip(t).await;

        let booking = Booking::reserve(trip_id, MemberId::new(), Utc::now());
        store.insert_booking(&booking).await.unwrap();

        let update = StateUpdate {
            new_state: BookingState::Cancelled,
            entered_at: Utc::now(),
            new_nonce: None,
            payment_ref: None,
            release_seat: false,
        };

        store
            .compare_and_swap_state(booking.id, BookingState::Reserved, update.clone())
            .await
            .unwrap();

        let err = store
            .compare_and_swap_state(booking.id, BookingState::Reserved, update)
            .await
            .unwrap_err();
        assert_eq!(err.kind, gout_core::error::ErrorKind::StaleState);
    }

    #[tokio::test]
    async fn test_job_insert_is_idempotent_on_key() {
        let store = MemoryBookingStore::new();
        let booking_id = BookingId::new();
        let entered = Utc::now();

        let job = Job::schedule(JobKind::ExpireSweep, booking_id, entered, entered);
        assert!(store.insert_job(&job).await.unwrap());

        let again = Job::schedule(JobKind::ExpireSweep, booking_id, entered, entered);
        assert!(!store.insert_job(&again).await.unwrap());
        assert_eq!(store.pending_jobs().await, 1);
    }
}
