//! Booking domain entities.

pub mod model;
pub mod state;

pub use model::Booking;
pub use state::BookingState;
