//! # gout-worker
//!
//! Background execution of scheduled booking jobs: the expiry sweep,
//! payment reconciliation, and departure reminders.
//!
//! Jobs are rows in the shared store, minted by lifecycle transitions
//! with an idempotency key. The orchestrator drains due jobs; the
//! scheduler triggers the drain on a fixed interval.

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::{JobOrchestrator, SweepStats};
pub use scheduler::WorkerScheduler;
