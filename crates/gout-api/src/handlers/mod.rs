//! HTTP handlers grouped by domain.

pub mod auth;
pub mod booking;
pub mod checkin;
pub mod health;
pub mod jobs;
pub mod trip;
