//! Route definitions for the GoutTogether HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(booking_routes())
        .merge(trip_routes())
        .merge(checkin_routes())
        .merge(job_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Auth endpoints: register, login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Booking lifecycle endpoints
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(handlers::booking::reserve))
        .route("/bookings/{id}", get(handlers::booking::get))
        .route(
            "/bookings/{id}/payment",
            post(handlers::booking::confirm_payment),
        )
        .route("/bookings/{id}/cancel", post(handlers::booking::cancel))
        .route(
            "/bookings/{id}/credential",
            get(handlers::booking::credential),
        )
}

/// Trip read endpoints
fn trip_routes() -> Router<AppState> {
    Router::new().route("/trips/{id}", get(handlers::trip::get))
}

/// Check-in scanning endpoint (staff)
fn checkin_routes() -> Router<AppState> {
    Router::new().route("/checkin", post(handlers::checkin::check_in))
}

/// Manual sweep endpoint (staff)
fn job_routes() -> Router<AppState> {
    Router::new().route("/jobs/run", post(handlers::jobs::run_due))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
