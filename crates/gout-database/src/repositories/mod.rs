//! Concrete repositories for entities outside the booking-store interface.

pub mod member;

pub use member::MemberRepository;
