//! PostgreSQL implementation of the booking store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gout_core::error::{AppError, ErrorKind};
use gout_core::result::AppResult;
use gout_core::types::{BookingId, JobId, MemberId, TripId};
use gout_entity::booking::{Booking, BookingState};
use gout_entity::job::Job;
use gout_entity::member::Member;
use gout_entity::trip::Trip;

use super::{BookingStore, StateUpdate};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Booking store backed by a PostgreSQL pool.
///
/// Concurrency control relies entirely on single-statement conditional
/// updates (the `state` column as CAS token, the `seats_held` counter as
/// capacity gate) and the partial unique index on non-terminal
/// (trip_id, member_id) pairs.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Create a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn load_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load booking", e))
    }

    async fn find_active_booking(
        &self,
        trip_id: TripId,
        member_id: MemberId,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings \
             WHERE trip_id = $1 AND member_id = $2 \
             AND state NOT IN ('checked_in', 'expired', 'cancelled')",
        )
        .bind(trip_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active booking", e)
        })
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO bookings \
             (id, trip_id, member_id, state, nonce, payment_ref, created_at, state_entered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(booking.member_id)
        .bind(booking.state)
        .bind(booking.nonce)
        .bind(&booking.payment_ref)
        .bind(booking.created_at)
        .bind(booking.state_entered_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The partial unique index on non-terminal (trip_id, member_id)
            // turns a lost reservation race into a duplicate error.
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::duplicate_booking(
                    "Member already holds an active booking for this trip",
                ))
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to insert booking",
                e,
            )),
        }
    }

    async fn compare_and_swap_state(
        &self,
        id: BookingId,
        expected: BookingState,
        update: StateUpdate,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET state = $3, \
                 state_entered_at = $4, \
                 nonce = COALESCE($5, nonce), \
                 payment_ref = COALESCE($6, payment_ref) \
             WHERE id = $1 AND state = $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(update.new_state)
        .bind(update.entered_at)
        .bind(update.new_nonce)
        .bind(&update.payment_ref)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transition", e))?;

        let Some(booking) = booking else {
            tx.rollback().await.ok();
            return Err(AppError::stale_state(format!(
                "Booking {id} is no longer in state '{expected}'"
            )));
        };

        if update.release_seat {
            sqlx::query("UPDATE trips SET seats_held = seats_held - 1 WHERE id = $1 AND seats_held > 0")
                .bind(booking.trip_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to release seat hold", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(booking)
    }

    async fn increment_seat_hold(&self, trip_id: TripId) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE trips SET seats_held = seats_held + 1 \
             WHERE id = $1 AND seats_held < capacity",
        )
        .bind(trip_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment seat hold", e)
        })?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Distinguish a full trip from an unknown one.
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM trips WHERE id = $1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load trip", e))?;

        match exists {
            Some(_) => Err(AppError::capacity_exceeded(format!(
                "Trip {trip_id} has no seats left"
            ))),
            None => Err(AppError::not_found(format!("Trip {trip_id} not found"))),
        }
    }

    async fn decrement_seat_hold(&self, trip_id: TripId) -> AppResult<()> {
        sqlx::query("UPDATE trips SET seats_held = seats_held - 1 WHERE id = $1 AND seats_held > 0")
            .bind(trip_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to decrement seat hold", e)
            })?;
        Ok(())
    }

    async fn load_trip(&self, id: TripId) -> AppResult<Option<Trip>> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load trip", e))
    }

    async fn load_member(&self, id: MemberId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load member", e))
    }

    async fn insert_job(&self, job: &Job) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO jobs (id, kind, booking_id, run_at, idempotency_key, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (idempotency_key) DO NOTHING",
        )
        .bind(job.id)
        .bind(job.kind)
        .bind(job.booking_id)
        .bind(job.run_at)
        .bind(&job.idempotency_key)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert job", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn select_due_jobs(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs \
             WHERE consumed_at IS NULL AND run_at <= $1 \
             ORDER BY run_at ASC \
             LIMIT $2",
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to select due jobs", e))
    }

    async fn mark_job_consumed(&self, id: JobId) -> AppResult<()> {
        sqlx::query("UPDATE jobs SET consumed_at = NOW() WHERE id = $1 AND consumed_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark job consumed", e)
            })?;
        Ok(())
    }
}
