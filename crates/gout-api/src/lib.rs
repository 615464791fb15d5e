//! # gout-api
//!
//! HTTP API layer for GoutTogether built on Axum.
//!
//! Provides the REST endpoints for authentication, booking lifecycle
//! operations, credential issuance, check-in scanning, and health, plus
//! the bearer-token extractor and error-to-status mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
