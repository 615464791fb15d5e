//! Check-in credential codec.

pub mod codec;

pub use codec::{CredentialClaims, CredentialCodec};
