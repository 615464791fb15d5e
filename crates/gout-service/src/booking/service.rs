//! Booking orchestration: reservations, payment, cancellation, and
//! credential issuance.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use gout_auth::credential::CredentialCodec;
use gout_core::config::booking::BookingConfig;
use gout_core::error::AppError;
use gout_core::result::AppResult;
use gout_core::types::{BookingId, TripId};
use gout_database::store::{BookingStore, StateUpdate};
use gout_entity::booking::{Booking, BookingState};
use gout_entity::job::{Job, JobKind};

use crate::context::AuthContext;

use super::allocator::SeatAllocator;
use super::machine::{self, BookingEvent};

/// A fresh reservation together with its check-in credential.
#[derive(Debug, Clone)]
pub struct ReservedBooking {
    /// The persisted booking.
    pub booking: Booking,
    /// Signed credential payload, ready to render as a QR code.
    pub credential: String,
}

/// The booking lifecycle service.
///
/// Owns reservation, payment confirmation, cancellation, and credential
/// issuance. Every state change goes through [`Self::apply_event`], which
/// plans the transition against the state machine and commits it with a
/// compare-and-swap.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    allocator: SeatAllocator,
    codec: CredentialCodec,
    config: BookingConfig,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(store: Arc<dyn BookingStore>, codec: CredentialCodec, config: BookingConfig) -> Self {
        let allocator = SeatAllocator::new(store.clone());
        Self {
            store,
            allocator,
            codec,
            config,
        }
    }

    /// Reserve a seat on a trip for the calling member.
    ///
    /// Takes the seat hold, persists the booking, schedules the reservation
    /// expiry sweep, and issues the check-in credential. The credential
    /// expires at trip departure.
    pub async fn reserve(&self, ctx: &AuthContext, trip_id: TripId) -> AppResult<ReservedBooking> {
        let trip = self
            .store
            .load_trip(trip_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trip {trip_id} not found")))?;

        let now = Utc::now();
        if trip.has_departed(now) {
            return Err(AppError::validation("Trip has already departed"));
        }

        let booking = self.allocator.reserve(trip_id, ctx.member_id, now).await?;

        let expire_at = booking.created_at + self.config.reservation_ttl();
        let job = Job::schedule(
            JobKind::ExpireSweep,
            booking.id,
            booking.state_entered_at,
            expire_at,
        );
        self.store.insert_job(&job).await?;

        let credential = self
            .codec
            .issue(booking.id, booking.nonce, trip.departure_at)?;

        info!(
            booking_id = %booking.id,
            trip_id = %trip_id,
            member_id = %ctx.member_id,
            "booking reserved"
        );

        Ok(ReservedBooking {
            booking,
            credential,
        })
    }

    /// Confirm payment for a booking.
    ///
    /// Walks the booking from `Reserved` through `AwaitingPayment` to
    /// `Confirmed` against the presented payment reference. A booking that
    /// already sits in `AwaitingPayment` (an earlier confirmation attempt
    /// that recorded the reference but lost the confirm step) resumes at
    /// the confirm step.
    pub async fn confirm_payment(
        &self,
        ctx: &AuthContext,
        booking_id: BookingId,
        payment_ref: &str,
    ) -> AppResult<Booking> {
        let booking = self.load_owned(ctx, booking_id).await?;

        let booking = if booking.state == BookingState::Reserved {
            self.apply_event(
                booking_id,
                &BookingEvent::PaymentInitiated {
                    payment_ref: payment_ref.to_string(),
                },
            )
            .await?
        } else {
            booking
        };

        let confirmed = self
            .apply_event(
                booking.id,
                &BookingEvent::PaymentConfirmed {
                    payment_ref: payment_ref.to_string(),
                },
            )
            .await?;

        info!(booking_id = %booking_id, "payment confirmed");
        Ok(confirmed)
    }

    /// Cancel a booking, releasing its seat hold.
    pub async fn cancel(&self, ctx: &AuthContext, booking_id: BookingId) -> AppResult<Booking> {
        self.load_owned(ctx, booking_id).await?;
        let cancelled = self.apply_event(booking_id, &BookingEvent::Cancel).await?;
        info!(booking_id = %booking_id, "booking cancelled");
        Ok(cancelled)
    }

    /// Fetch a booking the caller may see.
    pub async fn get(&self, ctx: &AuthContext, booking_id: BookingId) -> AppResult<Booking> {
        self.load_owned(ctx, booking_id).await
    }

    /// Re-issue the check-in credential for an active booking.
    ///
    /// Issuance is deterministic, so a re-issued credential is identical to
    /// the previous one until the nonce rotates at payment confirmation.
    pub async fn credential(&self, ctx: &AuthContext, booking_id: BookingId) -> AppResult<String> {
        let booking = self.load_owned(ctx, booking_id).await?;
        if booking.state.is_terminal() {
            return Err(AppError::invalid_transition(
                "Credential cannot be issued for a finished booking",
            ));
        }

        let trip = self
            .store
            .load_trip(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trip {} not found", booking.trip_id)))?;

        self.codec.issue(booking.id, booking.nonce, trip.departure_at)
    }

    /// Plan and commit a single lifecycle event.
    ///
    /// The commit is a compare-and-swap on the state observed at planning
    /// time; a concurrent transition makes the commit fail with
    /// `StaleState` and nothing is written. Follow-up jobs are enqueued
    /// after the commit, keyed so a retried enqueue is a no-op.
    pub async fn apply_event(
        &self,
        booking_id: BookingId,
        event: &BookingEvent,
    ) -> AppResult<Booking> {
        let booking = self
            .store
            .load_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))?;

        let trip = self
            .store
            .load_trip(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trip {} not found", booking.trip_id)))?;

        let now = Utc::now();
        let plan = machine::plan(&booking, &trip, event, &self.config, now)?;

        let update = StateUpdate {
            new_state: plan.to,
            entered_at: now,
            new_nonce: plan.mint_nonce,
            payment_ref: plan.record_payment_ref.clone(),
            release_seat: plan.releases_seat(),
        };
        let committed = self
            .store
            .compare_and_swap_state(booking.id, plan.from, update)
            .await?;

        for scheduled in &plan.jobs {
            let job = Job::schedule(
                scheduled.kind,
                committed.id,
                committed.state_entered_at,
                scheduled.run_at,
            );
            self.store.insert_job(&job).await?;
        }

        info!(
            booking_id = %booking_id,
            event = event.name(),
            from = %plan.from,
            to = %plan.to,
            "booking transition committed"
        );
        Ok(committed)
    }

    async fn load_owned(&self, ctx: &AuthContext, booking_id: BookingId) -> AppResult<Booking> {
        let booking = self
            .store
            .load_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))?;
        ctx.require_owner_or_staff(booking.member_id)?;
        Ok(booking)
    }
}
