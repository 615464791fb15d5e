//! Booking lifecycle deadline configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Deadlines governing the booking lifecycle.
///
/// The reservation TTL and payment TTL are two independently configurable
/// durations; they bound how long a booking may sit in `Reserved` and
/// `AwaitingPayment` respectively before the expiry sweep reaps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Minutes a booking may remain in `Reserved` before expiring.
    #[serde(default = "default_reservation_ttl")]
    pub reservation_ttl_minutes: u64,
    /// Minutes a booking may remain in `AwaitingPayment` before expiring.
    #[serde(default = "default_payment_ttl")]
    pub payment_ttl_minutes: u64,
    /// Hours before departure at which the reminder job fires.
    #[serde(default = "default_reminder_lead")]
    pub reminder_lead_hours: u64,
}

impl BookingConfig {
    /// Reservation TTL as a chrono duration.
    pub fn reservation_ttl(&self) -> Duration {
        Duration::minutes(self.reservation_ttl_minutes as i64)
    }

    /// Payment TTL as a chrono duration.
    pub fn payment_ttl(&self) -> Duration {
        Duration::minutes(self.payment_ttl_minutes as i64)
    }

    /// Reminder lead time as a chrono duration.
    pub fn reminder_lead(&self) -> Duration {
        Duration::hours(self.reminder_lead_hours as i64)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_minutes: default_reservation_ttl(),
            payment_ttl_minutes: default_payment_ttl(),
            reminder_lead_hours: default_reminder_lead(),
        }
    }
}

fn default_reservation_ttl() -> u64 {
    15
}

fn default_payment_ttl() -> u64 {
    30
}

fn default_reminder_lead() -> u64 {
    24
}
