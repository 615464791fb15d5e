//! # gout-auth
//!
//! Bearer-token verification/issuance, check-in credential signing, and
//! password hashing for the GoutTogether platform.
//!
//! ## Modules
//!
//! - `jwt` — bearer token creation and validation with key rotation
//! - `credential` — signed, expiring check-in credential codec
//! - `password` — Argon2id password hashing

pub mod credential;
pub mod jwt;
pub mod password;

pub use credential::{CredentialClaims, CredentialCodec};
pub use jwt::{Claims, TokenIssuer, TokenVerifier};
pub use password::PasswordHasher;
