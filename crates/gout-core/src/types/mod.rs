//! Shared type definitions.

pub mod id;

pub use id::{BookingId, JobId, MemberId, TripId};
