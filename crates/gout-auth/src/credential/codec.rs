//! Signed, expiring check-in credential encode/decode.
//!
//! The credential is a compact binary structure:
//!
//! ```text
//! booking_id (16 bytes) ‖ nonce (16 bytes) ‖ expiry epoch-seconds (8 bytes, BE)
//! ```
//!
//! followed by an HMAC-SHA256 tag over those 40 bytes, the whole thing
//! base64url-encoded without padding — 96 characters, small enough for a
//! scannable QR code. Encoding is deterministic: re-issuing for the same
//! (booking, nonce, expiry) yields identical output.
//!
//! Decoding is side-effect-free and does **not** consult booking state;
//! nonce currency and lifecycle guards belong to the verification service.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use gout_core::config::auth::AuthConfig;
use gout_core::error::AppError;
use gout_core::types::BookingId;

type HmacSha256 = Hmac<Sha256>;

/// Unsigned portion of the credential payload.
const BODY_LEN: usize = 16 + 16 + 8;
/// HMAC-SHA256 tag length.
const TAG_LEN: usize = 32;

/// Fields recovered from a structurally valid, correctly signed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    /// The booking the credential is bound to.
    pub booking_id: BookingId,
    /// Nonce minted when the credential generation was last rotated.
    pub nonce: Uuid,
    /// Expiry instant; credentials are rejected at and after this time.
    pub expires_at: DateTime<Utc>,
}

/// Encodes and decodes check-in credentials.
///
/// The signing key is process-wide configuration, loaded once at startup
/// and never mutated at runtime.
#[derive(Clone)]
pub struct CredentialCodec {
    key: Vec<u8>,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec").finish()
    }
}

impl CredentialCodec {
    /// Creates a new codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            key: config.credential_secret.as_bytes().to_vec(),
        }
    }

    /// Issue a signed credential payload for the given booking.
    pub fn issue(
        &self,
        booking_id: BookingId,
        nonce: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let mut body = Vec::with_capacity(BODY_LEN + TAG_LEN);
        body.extend_from_slice(booking_id.as_uuid().as_bytes());
        body.extend_from_slice(nonce.as_bytes());
        body.extend_from_slice(&expires_at.timestamp().to_be_bytes());

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::internal(format!("Credential key setup failed: {e}")))?;
        mac.update(&body);
        body.extend_from_slice(&mac.finalize().into_bytes());

        Ok(URL_SAFE_NO_PAD.encode(body))
    }

    /// Decode and verify a credential payload.
    ///
    /// Structural corruption, signature mismatch, and expiry at or before
    /// `now` all surface `InvalidCredential`.
    pub fn decode(&self, payload: &str, now: DateTime<Utc>) -> Result<CredentialClaims, AppError> {
        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::invalid_credential("Credential is not valid base64"))?;

        if raw.len() != BODY_LEN + TAG_LEN {
            return Err(AppError::invalid_credential("Credential has wrong length"));
        }
        let (body, tag) = raw.split_at(BODY_LEN);

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::internal(format!("Credential key setup failed: {e}")))?;
        mac.update(body);
        // Constant-time comparison.
        mac.verify_slice(tag)
            .map_err(|_| AppError::invalid_credential("Credential signature mismatch"))?;

        let booking_id = BookingId::from_uuid(Uuid::from_slice(&body[0..16]).map_err(|_| {
            AppError::invalid_credential("Credential carries a malformed booking id")
        })?);
        let nonce = Uuid::from_slice(&body[16..32])
            .map_err(|_| AppError::invalid_credential("Credential carries a malformed nonce"))?;

        let mut epoch_bytes = [0u8; 8];
        epoch_bytes.copy_from_slice(&body[32..40]);
        let epoch = i64::from_be_bytes(epoch_bytes);
        let expires_at = Utc
            .timestamp_opt(epoch, 0)
            .single()
            .ok_or_else(|| AppError::invalid_credential("Credential expiry out of range"))?;

        if now >= expires_at {
            return Err(AppError::invalid_credential("Credential has expired"));
        }

        Ok(CredentialClaims {
            booking_id,
            nonce,
            expires_at,
        })
    }
}
