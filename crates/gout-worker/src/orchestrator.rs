//! Drains due jobs and executes them against the booking lifecycle.
//!
//! Execution is at-least-once: a job stays queued until its effect is
//! known to be applied or known to be unnecessary. A transition that
//! loses to a concurrent one (the booking moved on) makes the job a
//! no-op, which still consumes it; only storage failures leave the job
//! queued for the next sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use gout_core::config::worker::WorkerConfig;
use gout_core::result::AppResult;
use gout_database::store::BookingStore;
use gout_entity::booking::BookingState;
use gout_entity::job::{Job, JobKind};
use gout_service::booking::{BookingEvent, BookingService};

/// Outcome counts for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Jobs selected as due.
    pub selected: usize,
    /// Jobs whose transition committed.
    pub applied: usize,
    /// Jobs consumed without effect (booking had already moved on).
    pub skipped: usize,
    /// Jobs left queued after a storage failure.
    pub failed: usize,
}

/// Executes due jobs against the booking lifecycle.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn BookingStore>,
    bookings: BookingService,
    config: WorkerConfig,
}

enum Outcome {
    Applied,
    Skipped,
}

impl JobOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        store: Arc<dyn BookingStore>,
        bookings: BookingService,
        config: WorkerConfig,
    ) -> Self {
        Self {
            store,
            bookings,
            config,
        }
    }

    /// Run one sweep pass: select due jobs and execute each.
    pub async fn run_due(&self, now: DateTime<Utc>) -> AppResult<SweepStats> {
        let due = self
            .store
            .select_due_jobs(now, self.config.batch_size)
            .await?;

        let mut stats = SweepStats {
            selected: due.len(),
            ..SweepStats::default()
        };

        for job in due {
            match self.execute(&job).await {
                Ok(Outcome::Applied) => {
                    self.store.mark_job_consumed(job.id).await?;
                    stats.applied += 1;
                }
                Ok(Outcome::Skipped) => {
                    self.store.mark_job_consumed(job.id).await?;
                    stats.skipped += 1;
                }
                Err(e) if e.kind.is_guard_mismatch() => {
                    // The booking moved on between scheduling and now.
                    debug!(
                        job_id = %job.id,
                        booking_id = %job.booking_id,
                        kind = %job.kind,
                        "job superseded by a newer transition"
                    );
                    self.store.mark_job_consumed(job.id).await?;
                    stats.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        booking_id = %job.booking_id,
                        kind = %job.kind,
                        error = %e,
                        "job execution failed; leaving it queued"
                    );
                    stats.failed += 1;
                }
            }
        }

        if stats.selected > 0 {
            info!(
                selected = stats.selected,
                applied = stats.applied,
                skipped = stats.skipped,
                failed = stats.failed,
                "sweep pass finished"
            );
        }
        Ok(stats)
    }

    async fn execute(&self, job: &Job) -> AppResult<Outcome> {
        match job.kind {
            JobKind::ExpireSweep => {
                self.bookings
                    .apply_event(job.booking_id, &BookingEvent::ExpirySweep)
                    .await?;
                Ok(Outcome::Applied)
            }

            JobKind::ReconcilePayment => {
                let Some(booking) = self.store.load_booking(job.booking_id).await? else {
                    warn!(booking_id = %job.booking_id, "reconcile target no longer exists");
                    return Ok(Outcome::Skipped);
                };
                if booking.state != BookingState::AwaitingPayment {
                    return Ok(Outcome::Skipped);
                }
                let Some(payment_ref) = booking.payment_ref.clone() else {
                    return Ok(Outcome::Skipped);
                };
                self.bookings
                    .apply_event(job.booking_id, &BookingEvent::PaymentConfirmed { payment_ref })
                    .await?;
                info!(booking_id = %job.booking_id, "payment reconciled");
                Ok(Outcome::Applied)
            }

            JobKind::Reminder => {
                let Some(booking) = self.store.load_booking(job.booking_id).await? else {
                    return Ok(Outcome::Skipped);
                };
                if booking.state != BookingState::Confirmed {
                    return Ok(Outcome::Skipped);
                }
                // Delivery is out of process; recording the decision here is
                // the job's whole effect.
                info!(
                    booking_id = %booking.id,
                    member_id = %booking.member_id,
                    trip_id = %booking.trip_id,
                    "departure reminder due"
                );
                Ok(Outcome::Applied)
            }
        }
    }
}
