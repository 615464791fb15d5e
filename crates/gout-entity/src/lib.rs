//! # gout-entity
//!
//! Domain entities for the GoutTogether booking engine: trips, bookings and
//! their lifecycle states, members, and background jobs.

pub mod booking;
pub mod job;
pub mod member;
pub mod trip;
