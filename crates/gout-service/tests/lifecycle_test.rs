//! Integration tests for the booking lifecycle over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use gout_auth::credential::CredentialCodec;
use gout_core::config::auth::AuthConfig;
use gout_core::config::booking::BookingConfig;
use gout_core::error::ErrorKind;
use gout_core::types::{MemberId, TripId};
use gout_database::store::MemoryBookingStore;
use gout_database::BookingStore;
use gout_entity::booking::BookingState;
use gout_entity::member::{Member, MemberRole};
use gout_entity::trip::Trip;
use gout_service::context::AuthContext;
use gout_service::{BookingService, CheckInService};

fn codec() -> CredentialCodec {
    CredentialCodec::new(&AuthConfig {
        jwt_secret: "unused".to_string(),
        jwt_previous_secret: None,
        jwt_ttl_minutes: 60,
        credential_secret: "integration-credential-key".to_string(),
    })
}

fn member_ctx() -> AuthContext {
    AuthContext::new(MemberId::new(), MemberRole::Member, "m@example.com".into())
}

fn staff_ctx() -> AuthContext {
    AuthContext::new(MemberId::new(), MemberRole::Staff, "s@example.com".into())
}

async fn seed_trip(store: &MemoryBookingStore, capacity: i32) -> TripId {
    let trip = Trip {
        id: TripId::new(),
        title: "Koh Lipe long weekend".to_string(),
        departure_at: Utc::now() + Duration::days(10),
        capacity,
        seats_held: 0,
    };
    let id = trip.id;
    store.insert_trip(trip).await;
    id
}

async fn seed_member(store: &MemoryBookingStore, ctx: &AuthContext) {
    store
        .insert_member(Member {
            id: ctx.member_id,
            email: ctx.email.clone(),
            first_name: "Arun".to_string(),
            last_name: "T.".to_string(),
            password_hash: "x".to_string(),
            role: ctx.role,
            created_at: Utc::now(),
        })
        .await;
}

#[tokio::test]
async fn test_happy_path_reserve_pay_check_in() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 3).await;
    let owner = member_ctx();
    seed_member(&store, &owner).await;

    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
    let checkin = CheckInService::new(store.clone(), codec(), BookingConfig::default());

    // Reserve: seat held, expiry job queued, credential issued.
    let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
    assert_eq!(reserved.booking.state, BookingState::Reserved);
    assert_eq!(store.seats_held(trip_id).await, 1);
    assert_eq!(store.pending_jobs().await, 1);

    // Confirm payment: state advances, nonce rotates, follow-up jobs queued.
    let confirmed = bookings
        .confirm_payment(&owner, reserved.booking.id, "pay_abc")
        .await
        .unwrap();
    assert_eq!(confirmed.state, BookingState::Confirmed);
    assert_ne!(confirmed.nonce, reserved.booking.nonce);

    // Check in with a freshly issued credential.
    let credential = bookings.credential(&owner, confirmed.id).await.unwrap();
    let summary = checkin.check_in(&staff_ctx(), &credential).await.unwrap();
    assert_eq!(summary.booking_id, confirmed.id);

    let final_state = store.load_booking(confirmed.id).await.unwrap().unwrap();
    assert_eq!(final_state.state, BookingState::CheckedIn);
    // The passenger keeps their seat through boarding.
    assert_eq!(store.seats_held(trip_id).await, 1);
}

#[tokio::test]
async fn test_last_seat_race_admits_exactly_one() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 1).await;
    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());

    let a = member_ctx();
    let b = member_ctx();

    let (res_a, res_b) = tokio::join!(
        bookings.reserve(&a, trip_id),
        bookings.reserve(&b, trip_id),
    );

    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let loser = if res_a.is_err() { res_a } else { res_b };
    assert_eq!(loser.unwrap_err().kind, ErrorKind::CapacityExceeded);
    assert_eq!(store.seats_held(trip_id).await, 1);
}

#[tokio::test]
async fn test_cancel_frees_the_seat_for_another_member() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 1).await;
    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());

    let first = member_ctx();
    let reserved = bookings.reserve(&first, trip_id).await.unwrap();

    let second = member_ctx();
    let err = bookings.reserve(&second, trip_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CapacityExceeded);

    bookings.cancel(&first, reserved.booking.id).await.unwrap();
    assert_eq!(store.seats_held(trip_id).await, 0);

    let retaken = bookings.reserve(&second, trip_id).await.unwrap();
    assert_eq!(retaken.booking.state, BookingState::Reserved);
    assert_eq!(store.seats_held(trip_id).await, 1);
}

#[tokio::test]
async fn test_superseded_credential_cannot_board() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 2).await;
    let owner = member_ctx();
    seed_member(&store, &owner).await;

    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
    let checkin = CheckInService::new(store.clone(), codec(), BookingConfig::default());

    let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
    bookings
        .confirm_payment(&owner, reserved.booking.id, "pay_abc")
        .await
        .unwrap();

    // The credential issued at reservation time carries the rotated-out
    // nonce: structurally valid, but no longer current.
    let err = checkin
        .check_in(&staff_ctx(), &reserved.credential)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredential);

    // The booking itself is untouched and the fresh credential still works.
    let credential = bookings
        .credential(&owner, reserved.booking.id)
        .await
        .unwrap();
    checkin.check_in(&staff_ctx(), &credential).await.unwrap();
}

#[tokio::test]
async fn test_double_scan_admits_once() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 2).await;
    let owner = member_ctx();
    seed_member(&store, &owner).await;

    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
    let checkin = CheckInService::new(store.clone(), codec(), BookingConfig::default());

    let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
    bookings
        .confirm_payment(&owner, reserved.booking.id, "pay_abc")
        .await
        .unwrap();
    let credential = bookings
        .credential(&owner, reserved.booking.id)
        .await
        .unwrap();

    let staff_a = staff_ctx();
    let staff_b = staff_ctx();
    let (first, second) = tokio::join!(
        checkin.check_in(&staff_a, &credential),
        checkin.check_in(&staff_b, &credential),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let booking = store.load_booking(reserved.booking.id).await.unwrap().unwrap();
    assert_eq!(booking.state, BookingState::CheckedIn);
}

#[tokio::test]
async fn test_member_cannot_act_on_another_members_booking() {
    let store = Arc::new(MemoryBookingStore::new());
    let trip_id = seed_trip(&store, 2).await;
    let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());

    let owner = member_ctx();
    let reserved = bookings.reserve(&owner, trip_id).await.unwrap();

    let stranger = member_ctx();
    for result in [
        bookings
            .confirm_payment(&stranger, reserved.booking.id, "pay_x")
            .await
            .map(|_| ()),
        bookings
            .cancel(&stranger, reserved.booking.id)
            .await
            .map(|_| ()),
        bookings
            .credential(&stranger, reserved.booking.id)
            .await
            .map(|_| ()),
    ] {
        assert_eq!(result.unwrap_err().kind, ErrorKind::Forbidden);
    }
}
