//! Seat allocation under concurrency.
//!
//! The allocator takes the hold *before* inserting the booking row, so a
//! successful insert always has a seat backing it. If the insert then
//! fails (duplicate pair, storage error), the hold is given back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use gout_core::error::AppError;
use gout_core::result::AppResult;
use gout_core::types::{MemberId, TripId};
use gout_database::store::BookingStore;
use gout_entity::booking::Booking;

/// Allocates seats and creates reservations.
#[derive(Clone)]
pub struct SeatAllocator {
    store: Arc<dyn BookingStore>,
}

impl SeatAllocator {
    /// Creates a new allocator over the given store.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Take one seat on `trip_id` for `member_id` and create the booking.
    ///
    /// Capacity is enforced by the store's atomic hold increment, so
    /// concurrent reservations for the last seat resolve to exactly one
    /// winner. Fails with `DuplicateBooking` when the member already holds
    /// a non-terminal booking on the trip, and `CapacityExceeded` when the
    /// trip is full.
    pub async fn reserve(
        &self,
        trip_id: TripId,
        member_id: MemberId,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        if self
            .store
            .find_active_booking(trip_id, member_id)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_booking(
                "Member already has an active booking on this trip",
            ));
        }

        self.store.increment_seat_hold(trip_id).await?;

        let booking = Booking::reserve(trip_id, member_id, now);
        if let Err(err) = self.store.insert_booking(&booking).await {
            if let Err(rollback_err) = self.store.decrement_seat_hold(trip_id).await {
                warn!(
                    trip_id = %trip_id,
                    error = %rollback_err,
                    "failed to return seat hold after booking insert failure"
                );
            }
            return Err(err);
        }

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gout_core::error::ErrorKind;
    use gout_database::store::MemoryBookingStore;
    use gout_entity::trip::Trip;

    fn trip_with_capacity(capacity: i32) -> Trip {
        Trip {
            id: TripId::new(),
            title: "Chiang Mai loop".to_string(),
            departure_at: Utc::now() + chrono::Duration::days(7),
            capacity,
            seats_held: 0,
        }
    }

    #[tokio::test]
    async fn test_reserve_takes_a_hold() {
        let store = Arc::new(MemoryBookingStore::new());
        let trip = trip_with_capacity(2);
        let trip_id = trip.id;
        store.insert_trip(trip).await;

        let allocator = SeatAllocator::new(store.clone());
        let booking = allocator
            .reserve(trip_id, MemberId::new(), Utc::now())
            .await
            .unwrap();

        assert_eq!(booking.trip_id, trip_id);
        assert_eq!(store.seats_held(trip_id).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_reservation_rejected_without_consuming_a_seat() {
        let store = Arc::new(MemoryBookingStore::new());
        let trip = trip_with_capacity(5);
        let trip_id = trip.id;
        store.insert_trip(trip).await;

        let allocator = SeatAllocator::new(store.clone());
        let member = MemberId::new();
        allocator.reserve(trip_id, member, Utc::now()).await.unwrap();

        let err = allocator
            .reserve(trip_id, member, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBooking);
        assert_eq!(store.seats_held(trip_id).await, 1);
    }

    #[tokio::test]
    async fn test_full_trip_rejects_reservation() {
        let store = Arc::new(MemoryBookingStore::new());
        let trip = trip_with_capacity(1);
        let trip_id = trip.id;
        store.insert_trip(trip).await;

        let allocator = SeatAllocator::new(store.clone());
        allocator
            .reserve(trip_id, MemberId::new(), Utc::now())
            .await
            .unwrap();

        let err = allocator
            .reserve(trip_id, MemberId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
        assert_eq!(store.seats_held(trip_id).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_trip() {
        let store = Arc::new(MemoryBookingStore::new());
        let allocator = SeatAllocator::new(store);

        let err = allocator
            .reserve(TripId::new(), MemberId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
