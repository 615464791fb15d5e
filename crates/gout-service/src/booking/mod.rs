//! Booking lifecycle: state machine, seat allocation, and the service
//! orchestrating them.

pub mod allocator;
pub mod machine;
pub mod service;

pub use allocator::SeatAllocator;
pub use machine::{BookingEvent, TransitionPlan};
pub use service::{BookingService, ReservedBooking};
