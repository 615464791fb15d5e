//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gout_core::types::{BookingId, JobId};

use super::kind::JobKind;

/// A scheduled unit of background work targeting one booking.
///
/// The idempotency key is derived from the booking, the kind, and the
/// state-entry timestamp of the transition that scheduled it: re-scheduling
/// the same follow-up is a no-op, and a job scheduled for a superseded
/// state can never be minted twice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// What this job does when it fires.
    pub kind: JobKind,
    /// The booking the job targets.
    pub booking_id: BookingId,
    /// Earliest execution time.
    pub run_at: DateTime<Utc>,
    /// Uniqueness key: `{booking_id}:{kind}:{state_entered_at_epoch}`.
    pub idempotency_key: String,
    /// Set once the job has been executed to logical effect.
    pub consumed_at: Option<DateTime<Utc>>,
    /// When the job was scheduled.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Build a job for the given booking and transition epoch.
    pub fn schedule(
        kind: JobKind,
        booking_id: BookingId,
        state_entered_at: DateTime<Utc>,
        run_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            kind,
            booking_id,
            run_at,
            idempotency_key: Self::idempotency_key(kind, booking_id, state_entered_at),
            consumed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Derive the idempotency key for a (booking, kind, state-entry) triple.
    pub fn idempotency_key(
        kind: JobKind,
        booking_id: BookingId,
        state_entered_at: DateTime<Utc>,
    ) -> String {
        format!(
            "{}:{}:{}",
            booking_id,
            kind,
            state_entered_at.timestamp_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_is_stable() {
        let booking_id = BookingId::new();
        let entered = Utc::now();
        let a = Job::schedule(JobKind::ExpireSweep, booking_id, entered, entered);
        let b = Job::schedule(JobKind::ExpireSweep, booking_id, entered, entered);
        assert_eq!(a.idempotency_key, b.idempotency_key);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_idempotency_key_varies_by_kind_and_epoch() {
        let booking_id = BookingId::new();
        let entered = Utc::now();
        let sweep = Job::idempotency_key(JobKind::ExpireSweep, booking_id, entered);
        let remind = Job::idempotency_key(JobKind::Reminder, booking_id, entered);
        let later = Job::idempotency_key(
            JobKind::ExpireSweep,
            booking_id,
            entered + chrono::Duration::seconds(1),
        );
        assert_ne!(sweep, remind);
        assert_ne!(sweep, later);
    }
}
