//! Background job domain entities.

pub mod kind;
pub mod model;

pub use kind::JobKind;
pub use model::Job;
