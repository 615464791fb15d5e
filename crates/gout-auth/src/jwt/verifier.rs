//! Bearer-token validation against a rotating signing-key set.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use gout_core::config::auth::AuthConfig;
use gout_core::error::AppError;

use super::claims::Claims;

/// Validates bearer tokens.
///
/// The verifier holds the current decoding key and, when configured, the
/// immediately preceding one, so that tokens signed just before a key
/// rotation stay valid through the rollover window. No mutable state.
#[derive(Clone)]
pub struct TokenVerifier {
    /// Decoding keys, current first.
    keys: Vec<DecodingKey>,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys.len())
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        let mut keys = vec![DecodingKey::from_secret(config.jwt_secret.as_bytes())];
        if let Some(previous) = &config.jwt_previous_secret {
            keys.push(DecodingKey::from_secret(previous.as_bytes()));
        }

        Self { keys, validation }
    }

    /// Decodes and validates a bearer token string.
    ///
    /// A token is accepted if it verifies against the current key or the
    /// immediately preceding one. Malformed, expired, and badly signed
    /// tokens all surface `Unauthenticated`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut last_err = None;

        for key in &self.keys {
            match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => {
                    // Only a signature mismatch justifies trying the older
                    // key; expiry and structural failures are final.
                    let retryable = matches!(
                        e.kind(),
                        jsonwebtoken::errors::ErrorKind::InvalidSignature
                    );
                    last_err = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(match last_err.map(|e| e.into_kind()) {
            Some(jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
                AppError::unauthenticated("Token has expired")
            }
            Some(jsonwebtoken::errors::ErrorKind::InvalidToken) => {
                AppError::unauthenticated("Invalid token format")
            }
            Some(jsonwebtoken::errors::ErrorKind::InvalidSignature) => {
                AppError::unauthenticated("Invalid token signature")
            }
            _ => AppError::unauthenticated("Token validation failed"),
        })
    }
}
