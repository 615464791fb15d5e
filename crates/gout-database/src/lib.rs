//! # gout-database
//!
//! Persistence layer for the GoutTogether booking engine: the
//! [`store::BookingStore`] collaborator interface, its PostgreSQL and
//! in-memory implementations, connection-pool management, the migration
//! runner, and the member repository used by the authentication path.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use store::{BookingStore, MemoryBookingStore, PgBookingStore, StateUpdate};
