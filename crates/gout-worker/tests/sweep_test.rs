//! Integration tests for the job sweep over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use gout_auth::credential::CredentialCodec;
use gout_core::config::auth::AuthConfig;
use gout_core::config::booking::BookingConfig;
use gout_core::config::worker::WorkerConfig;
use gout_core::types::{MemberId, TripId};
use gout_database::store::MemoryBookingStore;
use gout_database::BookingStore;
use gout_entity::booking::BookingState;
use gout_entity::member::MemberRole;
use gout_entity::trip::Trip;
use gout_service::context::AuthContext;
use gout_service::BookingService;
use gout_worker::JobOrchestrator;

fn harness(store: Arc<MemoryBookingStore>) -> (BookingService, JobOrchestrator) {
    let codec = CredentialCodec::new(&AuthConfig {
        jwt_secret: "unused".to_string(),
        jwt_previous_secret: None,
        jwt_ttl_minutes: 60,
        credential_secret: "integration-credential-key".to_string(),
    });
    let bookings = BookingService::new(store.clone(), codec, BookingConfig::default());
    let orchestrator = JobOrchestrator::new(store, bookings.clone(), WorkerConfig::default());
    (bookings, orchestrator)
}

fn member_ctx() -> AuthContext {
    AuthContext::new(MemberId::new(), MemberRole::Member, "m@example.com".into())
}

async fn seed_trip(store: &MemoryBookingStore, capacity: i32) -> TripId {
    let trip = Trip {
        id: TripId::new(),
        title: "Doi Inthanon sunrise".to_string(),
        departure_at: Utc::now() + Duration::days(10),
        capacity,
        seats_held: 0,
    };
    let id = trip.id;
    store.insert_trip(trip).await;
    id
}

#[tokio::test]
async fn test_confirmed_booking_survives_the_sweep_that_expires_a_lapsed_one() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 2).await;
    let (bookings, orchestrator) = harness(store.clone());

    let anna = member_ctx();
    let ben = member_ctx();

    let booking_a = bookings.reserve(&anna, trip_id).await.unwrap().booking;
    let booking_b = bookings.reserve(&ben, trip_id).await.unwrap().booking;
    assert_eq!(store.seats_held(trip_id).await, 2);

    // Anna pays; Ben never does.
    bookings
        .confirm_payment(&anna, booking_a.id, "pay_anna")
        .await
        .unwrap();

    // Past the reservation deadline both expiry jobs are due; only Ben's
    // booking may be reaped.
    let later = Utc::now() + Duration::minutes(20);
    let stats = orchestrator.run_due(later).await.unwrap();
    assert_eq!(stats.failed, 0);

    let a = store.load_booking(booking_a.id).await.unwrap().unwrap();
    let b = store.load_booking(booking_b.id).await.unwrap().unwrap();
    assert_eq!(a.state, BookingState::Confirmed);
    assert_eq!(b.state, BookingState::Expired);
    assert_eq!(store.seats_held(trip_id).await, 1);
}

#[tokio::test]
async fn test_awaiting_payment_expires_at_the_payment_deadline_not_before() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 1).await;
    let (bookings, orchestrator) = harness(store.clone());

    let owner = member_ctx();
    let booking = bookings.reserve(&owner, trip_id).await.unwrap().booking;
    bookings
        .apply_event(
            booking.id,
            &gout_service::booking::BookingEvent::PaymentInitiated {
                payment_ref: "pay_1".into(),
            },
        )
        .await
        .unwrap();

    // Past the reservation deadline the stale reservation-expiry job is
    // due, but the booking moved to AwaitingPayment and its own payment
    // deadline is still ahead: the sweep must not reap it.
    let mid = Utc::now() + Duration::minutes(16);
    orchestrator.run_due(mid).await.unwrap();
    let state = store.load_booking(booking.id).await.unwrap().unwrap().state;
    assert_ne!(state, BookingState::Expired);
    assert_eq!(store.seats_held(trip_id).await, 1);
}

#[tokio::test]
async fn test_duplicate_job_scheduling_is_a_no_op() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 1).await;
    let (bookings, _) = harness(store.clone());

    let booking = bookings.reserve(&member_ctx(), trip_id).await.unwrap().booking;
    let queued = store.pending_jobs().await;

    // Re-inserting the reservation expiry with the same idempotency key
    // changes nothing.
    let job = gout_entity::job::Job::schedule(
        gout_entity::job::JobKind::ExpireSweep,
        booking.id,
        booking.state_entered_at,
        booking.created_at + BookingConfig::default().reservation_ttl(),
    );
    assert!(!store.insert_job(&job).await.unwrap());
    assert_eq!(store.pending_jobs().await, queued);
}
