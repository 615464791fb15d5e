//! Check-in credential verification at boarding.

pub mod service;

pub use service::{CheckInService, CheckInSummary};
