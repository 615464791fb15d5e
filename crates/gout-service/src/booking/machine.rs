//! The booking state machine: pure transition planning.
//!
//! `plan` evaluates an event against a booking's current state and the
//! guard conditions, and returns what a commit would write — it performs
//! no I/O. The caller commits the plan with a single compare-and-swap
//! keyed on the expected state, so concurrent attempts race and exactly
//! one wins; losers observe `StaleState` at commit time.
//!
//! Transition table:
//!
//! | From              | Event              | Guard                                   | To              |
//! |-------------------|--------------------|-----------------------------------------|-----------------|
//! | Reserved          | payment-initiated  | within reservation TTL                  | AwaitingPayment |
//! | AwaitingPayment   | payment-confirmed  | payment reference matches recorded one  | Confirmed       |
//! | Reserved          | expiry-sweep       | now ≥ reservation deadline              | Expired         |
//! | AwaitingPayment   | expiry-sweep       | now ≥ payment deadline                  | Expired         |
//! | Confirmed         | check-in           | trip departure not yet passed           | CheckedIn       |
//! | any non-terminal  | cancel             | —                                       | Cancelled       |

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gout_core::config::booking::BookingConfig;
use gout_core::error::AppError;
use gout_core::result::AppResult;
use gout_entity::booking::{Booking, BookingState};
use gout_entity::job::JobKind;
use gout_entity::trip::Trip;

/// An event that may advance a booking's lifecycle.
///
/// Reservation itself is not an event: it creates the booking and is owned
/// by the seat allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvent {
    /// Member started paying; records the gateway reference.
    PaymentInitiated {
        /// Payment gateway reference.
        payment_ref: String,
    },
    /// Payment confirmed against the recorded reference.
    PaymentConfirmed {
        /// Payment gateway reference presented by the confirmer.
        payment_ref: String,
    },
    /// The expiry sweep fired for this booking.
    ExpirySweep,
    /// A staff member accepted the credential at boarding.
    CheckIn,
    /// Cancellation requested by the owning member or staff.
    Cancel,
}

impl BookingEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaymentInitiated { .. } => "payment-initiated",
            Self::PaymentConfirmed { .. } => "payment-confirmed",
            Self::ExpirySweep => "expiry-sweep",
            Self::CheckIn => "check-in",
            Self::Cancel => "cancel",
        }
    }
}

/// A follow-up job the committed transition schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    /// Kind of follow-up work.
    pub kind: JobKind,
    /// Earliest execution time.
    pub run_at: DateTime<Utc>,
}

/// What committing a transition writes.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    /// The state the compare-and-swap expects to find.
    pub from: BookingState,
    /// The state the booking moves to.
    pub to: BookingState,
    /// Fresh nonce, when the transition rotates the credential.
    pub mint_nonce: Option<Uuid>,
    /// Payment reference recorded by the transition.
    pub record_payment_ref: Option<String>,
    /// Follow-up jobs to enqueue after the commit.
    pub jobs: Vec<ScheduledJob>,
}

impl TransitionPlan {
    /// Whether the commit crosses from a seat-holding state to a
    /// non-holding one. This is the only trigger for hold release.
    pub fn releases_seat(&self) -> bool {
        self.from.holds_seat() && !self.to.holds_seat()
    }
}

/// Expiry deadline for the booking's current state, if the state has one.
pub fn expiry_deadline(booking: &Booking, config: &BookingConfig) -> Option<DateTime<Utc>> {
    match booking.state {
        BookingState::Reserved => Some(booking.created_at + config.reservation_ttl()),
        BookingState::AwaitingPayment => Some(booking.state_entered_at + config.payment_ttl()),
        _ => None,
    }
}

/// Evaluate `event` against the booking's current state and guards.
///
/// Returns the plan a commit would write, or `InvalidTransition` when the
/// event is not legal from the current state or a guard rejects it.
pub fn plan(
    booking: &Booking,
    trip: &Trip,
    event: &BookingEvent,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> AppResult<TransitionPlan> {
    match (booking.state, event) {
        (BookingState::Reserved, BookingEvent::PaymentInitiated { payment_ref }) => {
            if payment_ref.trim().is_empty() {
                return Err(AppError::validation("Payment reference must not be empty"));
            }
            let deadline = booking.created_at + config.reservation_ttl();
            if now >= deadline {
                return Err(AppError::invalid_transition(
                    "Reservation TTL elapsed; awaiting the expiry sweep",
                ));
            }
            let payment_deadline = now + config.payment_ttl();
            Ok(TransitionPlan {
                from: BookingState::Reserved,
                to: BookingState::AwaitingPayment,
                mint_nonce: None,
                record_payment_ref: Some(payment_ref.clone()),
                jobs: vec![
                    ScheduledJob {
                        kind: JobKind::ExpireSweep,
                        run_at: payment_deadline,
                    },
                    // Reconciliation nudge halfway to the deadline: recovers
                    // confirmations whose synchronous commit lost a race.
                    ScheduledJob {
                        kind: JobKind::ReconcilePayment,
                        run_at: now + config.payment_ttl() / 2,
                    },
                ],
            })
        }

        (BookingState::AwaitingPayment, BookingEvent::PaymentConfirmed { payment_ref }) => {
            if booking.payment_ref.as_deref() != Some(payment_ref.as_str()) {
                return Err(AppError::invalid_transition(
                    "Payment reference does not match the initiated payment",
                ));
            }
            let reminder_at = (trip.departure_at - config.reminder_lead()).max(now);
            Ok(TransitionPlan {
                from: BookingState::AwaitingPayment,
                to: BookingState::Confirmed,
                // Rotating the nonce invalidates every credential issued
                // before payment.
                mint_nonce: Some(Uuid::new_v4()),
                record_payment_ref: None,
                jobs: vec![ScheduledJob {
                    kind: JobKind::Reminder,
                    run_at: reminder_at,
                }],
            })
        }

        (BookingState::Reserved | BookingState::AwaitingPayment, BookingEvent::ExpirySweep) => {
            let deadline = match booking.state {
                BookingState::Reserved => booking.created_at + config.reservation_ttl(),
                _ => booking.state_entered_at + config.payment_ttl(),
            };
            if now < deadline {
                return Err(AppError::invalid_transition(
                    "Expiry deadline has not passed yet",
                ));
            }
            Ok(TransitionPlan {
                from: booking.state,
                to: BookingState::Expired,
                mint_nonce: None,
                record_payment_ref: None,
                jobs: vec![],
            })
        }

        (BookingState::Confirmed, BookingEvent::CheckIn) => {
            if trip.has_departed(now) {
                return Err(AppError::invalid_transition("Trip has already departed"));
            }
            Ok(TransitionPlan {
                from: BookingState::Confirmed,
                to: BookingState::CheckedIn,
                mint_nonce: None,
                record_payment_ref: None,
                jobs: vec![],
            })
        }

        (
            BookingState::Reserved | BookingState::AwaitingPayment | BookingState::Confirmed,
            BookingEvent::Cancel,
        ) => Ok(TransitionPlan {
            from: booking.state,
            to: BookingState::Cancelled,
            mint_nonce: None,
            record_payment_ref: None,
            jobs: vec![],
        }),

        (state, event) => Err(AppError::invalid_transition(format!(
            "Event '{}' is not legal from state '{state}'",
            event.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gout_core::error::ErrorKind;
    use gout_core::types::{MemberId, TripId};

    fn config() -> BookingConfig {
        BookingConfig {
            reservation_ttl_minutes: 15,
            payment_ttl_minutes: 30,
            reminder_lead_hours: 24,
        }
    }

    fn trip(departure_in: Duration) -> Trip {
        Trip {
            id: TripId::new(),
            title: "Phuket islands".to_string(),
            departure_at: Utc::now() + departure_in,
            capacity: 10,
            seats_held: 1,
        }
    }

    fn booking(state: BookingState) -> Booking {
        let now = Utc::now();
        let mut b = Booking::reserve(TripId::new(), MemberId::new(), now);
        b.state = state;
        b
    }

    #[test]
    fn test_payment_initiated_within_ttl() {
        let b = booking(BookingState::Reserved);
        let plan = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::PaymentInitiated {
                payment_ref: "pay_123".into(),
            },
            &config(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.to, BookingState::AwaitingPayment);
        assert_eq!(plan.record_payment_ref.as_deref(), Some("pay_123"));
        assert!(!plan.releases_seat());
        assert_eq!(plan.jobs.len(), 2);
    }

    #[test]
    fn test_payment_initiated_after_ttl_is_rejected() {
        let mut b = booking(BookingState::Reserved);
        b.created_at = Utc::now() - Duration::minutes(16);

        let err = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::PaymentInitiated {
                payment_ref: "pay_123".into(),
            },
            &config(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_payment_confirmed_rotates_nonce() {
        let mut b = booking(BookingState::AwaitingPayment);
        b.payment_ref = Some("pay_123".into());

        let plan = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::PaymentConfirmed {
                payment_ref: "pay_123".into(),
            },
            &config(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.to, BookingState::Confirmed);
        assert!(plan.mint_nonce.is_some());
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].kind, JobKind::Reminder);
    }

    #[test]
    fn test_payment_confirmed_with_wrong_reference() {
        let mut b = booking(BookingState::AwaitingPayment);
        b.payment_ref = Some("pay_123".into());

        let err = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::PaymentConfirmed {
                payment_ref: "pay_999".into(),
            },
            &config(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_expiry_sweep_respects_deadline() {
        let b = booking(BookingState::Reserved);
        // Deadline not reached yet.
        let err = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::ExpirySweep,
            &config(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);

        // Past the reservation deadline.
        let plan_ok = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::ExpirySweep,
            &config(),
            Utc::now() + Duration::minutes(16),
        )
        .unwrap();
        assert_eq!(plan_ok.to, BookingState::Expired);
        assert!(plan_ok.releases_seat());
    }

    #[test]
    fn test_expiry_sweep_never_touches_confirmed() {
        let b = booking(BookingState::Confirmed);
        let err = plan(
            &b,
            &trip(Duration::days(3)),
            &BookingEvent::ExpirySweep,
            &config(),
            Utc::now() + Duration::days(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_check_in_from_confirmed_before_departure() {
        let b = booking(BookingState::Confirmed);
        let plan = plan(
            &b,
            &trip(Duration::hours(2)),
            &BookingEvent::CheckIn,
            &config(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.to, BookingState::CheckedIn);
        // Checked-in passengers keep their seat.
        assert!(!plan.releases_seat());
    }

    #[test]
    fn test_check_in_after_departure_fails() {
        let b = booking(BookingState::Confirmed);
        let err = plan(
            &b,
            &trip(Duration::hours(-1)),
            &BookingEvent::CheckIn,
            &config(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_check_in_from_non_confirmed_states_fails() {
        for state in [
            BookingState::Reserved,
            BookingState::AwaitingPayment,
            BookingState::CheckedIn,
            BookingState::Expired,
            BookingState::Cancelled,
        ] {
            let b = booking(state);
            assert!(plan(
                &b,
                &trip(Duration::hours(2)),
                &BookingEvent::CheckIn,
                &config(),
                Utc::now(),
            )
            .is_err());
        }
    }

    #[test]
    fn test_cancel_releases_seat_from_every_non_terminal_state() {
        for state in [
            BookingState::Reserved,
            BookingState::AwaitingPayment,
            BookingState::Confirmed,
        ] {
            let b = booking(state);
            let plan = plan(
                &b,
                &trip(Duration::days(3)),
                &BookingEvent::Cancel,
                &config(),
                Utc::now(),
            )
            .unwrap();
            assert_eq!(plan.to, BookingState::Cancelled);
            assert!(plan.releases_seat());
        }
    }

    #[test]
    fn test_terminal_states_accept_no_events() {
        for state in [
            BookingState::CheckedIn,
            BookingState::Expired,
            BookingState::Cancelled,
        ] {
            let b = booking(state);
            for event in [
                BookingEvent::PaymentInitiated {
                    payment_ref: "x".into(),
                },
                BookingEvent::PaymentConfirmed {
                    payment_ref: "x".into(),
                },
                BookingEvent::ExpirySweep,
                BookingEvent::Cancel,
            ] {
                let err = plan(&b, &trip(Duration::days(3)), &event, &config(), Utc::now())
                    .unwrap_err();
                assert_eq!(err.kind, ErrorKind::InvalidTransition);
            }
        }
    }
}
