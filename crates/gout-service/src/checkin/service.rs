//! Scanning a credential and committing the check-in.
//!
//! Verification is layered: the codec proves the payload is authentic,
//! unexpired, and untampered; this service then proves it is *current*
//! (nonce matches the booking) and that the lifecycle permits check-in.
//! The final commit is a compare-and-swap, so two simultaneous scans of
//! the same credential admit exactly one passenger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use gout_auth::credential::CredentialCodec;
use gout_core::config::booking::BookingConfig;
use gout_core::error::{AppError, ErrorKind};
use gout_core::result::AppResult;
use gout_core::types::BookingId;
use gout_database::store::{BookingStore, StateUpdate};
use gout_entity::booking::BookingState;

use crate::booking::machine::{self, BookingEvent};
use crate::context::AuthContext;

/// What the gate agent sees after a successful scan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckInSummary {
    /// The booking that was checked in.
    pub booking_id: BookingId,
    /// Passenger display name.
    pub member_name: String,
    /// Trip title.
    pub trip_title: String,
    /// Trip departure time.
    pub departure_at: DateTime<Utc>,
}

/// Verifies scanned credentials and commits check-ins.
#[derive(Clone)]
pub struct CheckInService {
    store: Arc<dyn BookingStore>,
    codec: CredentialCodec,
    config: BookingConfig,
}

impl CheckInService {
    /// Creates a new check-in service.
    pub fn new(store: Arc<dyn BookingStore>, codec: CredentialCodec, config: BookingConfig) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    /// Verify a scanned credential and check the passenger in.
    ///
    /// Staff only. A credential whose nonce no longer matches the booking
    /// (it was issued before payment confirmation rotated the nonce) is
    /// rejected as invalid without touching the booking.
    pub async fn check_in(&self, ctx: &AuthContext, payload: &str) -> AppResult<CheckInSummary> {
        ctx.require_staff()?;

        let now = Utc::now();
        let claims = self.codec.decode(payload, now)?;

        let booking = self
            .store
            .load_booking(claims.booking_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Booking {} not found", claims.booking_id))
            })?;

        if booking.nonce != claims.nonce {
            return Err(AppError::invalid_credential(
                "Credential was superseded by a newer issuance",
            ));
        }

        let trip = self
            .store
            .load_trip(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trip {} not found", booking.trip_id)))?;

        let plan = machine::plan(&booking, &trip, &BookingEvent::CheckIn, &self.config, now)?;

        let update = StateUpdate {
            new_state: plan.to,
            entered_at: now,
            new_nonce: plan.mint_nonce,
            payment_ref: None,
            release_seat: plan.releases_seat(),
        };
        let committed = match self
            .store
            .compare_and_swap_state(booking.id, BookingState::Confirmed, update)
            .await
        {
            Ok(b) => b,
            // The losing scan of a simultaneous double scan lands here.
            Err(e) if e.kind == ErrorKind::StaleState => {
                return Err(AppError::invalid_transition(
                    "Booking was checked in by a concurrent scan",
                ));
            }
            Err(e) => return Err(e),
        };

        let member = self
            .store
            .load_member(committed.member_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Member {} not found", committed.member_id))
            })?;

        info!(
            booking_id = %committed.id,
            trip_id = %trip.id,
            scanned_by = %ctx.member_id,
            "passenger checked in"
        );

        Ok(CheckInSummary {
            booking_id: committed.id,
            member_name: member.display_name(),
            trip_title: trip.title,
            departure_at: trip.departure_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gout_core::config::auth::AuthConfig;
    use gout_core::types::{MemberId, TripId};
    use gout_database::store::MemoryBookingStore;
    use gout_entity::member::{Member, MemberRole};
    use gout_entity::trip::Trip;

    use crate::booking::BookingService;

    fn codec() -> CredentialCodec {
        CredentialCodec::new(&AuthConfig {
            jwt_secret: "unused".to_string(),
            jwt_previous_secret: None,
            jwt_ttl_minutes: 60,
            credential_secret: "checkin-signing-key".to_string(),
        })
    }

    fn staff_ctx() -> AuthContext {
        AuthContext::new(MemberId::new(), MemberRole::Staff, "s@example.com".into())
    }

    async fn seed(store: &MemoryBookingStore) -> (TripId, AuthContext) {
        let trip = Trip {
            id: TripId::new(),
            title: "Krabi kayaking".to_string(),
            departure_at: Utc::now() + Duration::days(2),
            capacity: 4,
            seats_held: 0,
        };
        let trip_id = trip.id;
        store.insert_trip(trip).await;

        let member = Member {
            id: MemberId::new(),
            email: "pim@example.com".to_string(),
            first_name: "Pim".to_string(),
            last_name: "S.".to_string(),
            password_hash: "x".to_string(),
            role: MemberRole::Member,
            created_at: Utc::now(),
        };
        let ctx = AuthContext::new(member.id, member.role, member.email.clone());
        store.insert_member(member).await;

        (trip_id, ctx)
    }

    #[tokio::test]
    async fn test_confirmed_credential_checks_in() {
        let store = Arc::new(MemoryBookingStore::new());
        let (trip_id, owner) = seed(&store).await;

        let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
        let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
        bookings
            .confirm_payment(&owner, reserved.booking.id, "pay_1")
            .await
            .unwrap();
        let credential = bookings
            .credential(&owner, reserved.booking.id)
            .await
            .unwrap();

        let checkin = CheckInService::new(store.clone(), codec(), BookingConfig::default());
        let summary = checkin.check_in(&staff_ctx(), &credential).await.unwrap();

        assert_eq!(summary.booking_id, reserved.booking.id);
        assert_eq!(summary.member_name, "Pim S.");
        assert_eq!(summary.trip_title, "Krabi kayaking");
    }

    #[tokio::test]
    async fn test_pre_payment_credential_is_rejected_after_nonce_rotation() {
        let store = Arc::new(MemoryBookingStore::new());
        let (trip_id, owner) = seed(&store).await;

        let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
        let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
        bookings
            .confirm_payment(&owner, reserved.booking.id, "pay_1")
            .await
            .unwrap();

        let checkin = CheckInService::new(store, codec(), BookingConfig::default());
        let err = checkin
            .check_in(&staff_ctx(), &reserved.credential)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_second_scan_is_rejected() {
        let store = Arc::new(MemoryBookingStore::new());
        let (trip_id, owner) = seed(&store).await;

        let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
        let reserved = bookings.reserve(&owner, trip_id).await.unwrap();
        bookings
            .confirm_payment(&owner, reserved.booking.id, "pay_1")
            .await
            .unwrap();
        let credential = bookings
            .credential(&owner, reserved.booking.id)
            .await
            .unwrap();

        let checkin = CheckInService::new(store, codec(), BookingConfig::default());
        checkin.check_in(&staff_ctx(), &credential).await.unwrap();

        let err = checkin
            .check_in(&staff_ctx(), &credential)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn test_non_staff_cannot_scan() {
        let store = Arc::new(MemoryBookingStore::new());
        let (_, member) = seed(&store).await;

        let checkin = CheckInService::new(store, codec(), BookingConfig::default());
        let err = checkin.check_in(&member, "whatever").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_unconfirmed_booking_cannot_check_in() {
        let store = Arc::new(MemoryBookingStore::new());
        let (trip_id, owner) = seed(&store).await;

        let bookings = BookingService::new(store.clone(), codec(), BookingConfig::default());
        let reserved = bookings.reserve(&owner, trip_id).await.unwrap();

        let checkin = CheckInService::new(store, codec(), BookingConfig::default());
        let err = checkin
            .check_in(&staff_ctx(), &reserved.credential)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }
}
