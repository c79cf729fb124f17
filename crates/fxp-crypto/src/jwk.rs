//! # JSON Web Key (OKP / Ed25519)
//!
//! The public-key JWK form (RFC 8037) used inside `did:jwk` identifiers.
//! Only `kty = "OKP"`, `crv = "Ed25519"` keys are supported; other members
//! of a received key (`use`, `kid`, ...) are ignored.

use serde::{Deserialize, Serialize};

use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;

/// A public JSON Web Key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type. Always `OKP` for Ed25519.
    pub kty: String,
    /// Curve name. Always `Ed25519`.
    pub crv: String,
    /// The base64url-encoded public key.
    pub x: String,
}

impl Jwk {
    /// Build the JWK for an Ed25519 public key.
    pub fn from_public_key(key: &Ed25519PublicKey) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: key.to_base64url(),
        }
    }

    /// Extract the Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] for non-Ed25519 keys or a
    /// malformed `x` member.
    pub fn to_public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        if self.kty != "OKP" || self.crv != "Ed25519" {
            return Err(CryptoError::InvalidPublicKey(format!(
                "unsupported JWK kty={:?} crv={:?}",
                self.kty, self.crv
            )));
        }
        let key = Ed25519PublicKey::from_base64url(&self.x)?;
        key.to_verifying_key()?;
        Ok(key)
    }
}
