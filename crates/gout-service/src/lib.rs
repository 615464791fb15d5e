//! # gout-service
//!
//! The booking lifecycle engine: the pure state machine, the seat
//! allocator, the booking service, and the check-in verification service.
//!
//! Services receive an [`context::AuthContext`] — a subject/role pair
//! already verified by the transport layer — and perform explicit
//! capability checks against it; no ambient role lookup happens here.

pub mod booking;
pub mod checkin;
pub mod context;

pub use booking::{BookingService, SeatAllocator};
pub use checkin::CheckInService;
pub use context::AuthContext;
