//! Application state shared across all handlers.

use std::sync::Arc;

use gout_auth::jwt::{TokenIssuer, TokenVerifier};
use gout_auth::password::PasswordHasher;
use gout_core::config::AppConfig;
use gout_database::repositories::member::MemberRepository;
use gout_database::store::BookingStore;
use gout_service::{BookingService, CheckInService};
use gout_worker::JobOrchestrator;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Shared relational store.
    pub store: Arc<dyn BookingStore>,
    /// Booking lifecycle service.
    pub bookings: BookingService,
    /// Check-in verification service.
    pub checkin: CheckInService,
    /// Job orchestrator (manual sweep endpoint).
    pub orchestrator: Arc<JobOrchestrator>,
    /// Bearer-token issuer.
    pub token_issuer: Arc<TokenIssuer>,
    /// Bearer-token verifier.
    pub token_verifier: Arc<TokenVerifier>,
    /// Argon2id password hasher.
    pub password_hasher: Arc<PasswordHasher>,
    /// Member account repository.
    pub members: Arc<MemberRepository>,
}
