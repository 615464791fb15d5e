//! Token and credential signing configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// The JWT secret pair supports key rotation: tokens signed with the
/// previous secret remain valid until the rollover window closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Current secret key for bearer-token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Immediately preceding signing key, accepted during rollover.
    #[serde(default)]
    pub jwt_previous_secret: Option<String>,
    /// Bearer token TTL in minutes.
    #[serde(default = "default_token_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Secret key for check-in credential signing (HMAC-SHA256).
    #[serde(default = "default_credential_secret")]
    pub credential_secret: String,
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    60
}

fn default_credential_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_TOO".to_string()
}
