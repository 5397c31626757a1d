//! Session key material and its per-store lifecycle.
//!
//! # Lifecycle
//!
//! 1. After sign-in, the application derives the user's [`SessionKey`] with
//!    [`SessionKey::for_user`] from the user id and the deployment-wide
//!    secret (see [`crate::config::Config`]).
//! 2. The key is bound to a store via `SecuredStore::initialize` or
//!    `SecuredStore::with_key`, and lives in that store's [`KeySlot`].
//! 3. The key is never rotated within a session. Re-initialising replaces it
//!    but does not re-encrypt data already stored under the old key.
//!
//! # Security invariants
//!
//! - Key material is never logged, included in error messages, or printed by
//!   `Debug`.
//! - Buffers holding key material are zeroed on drop.

pub mod slot;

pub use slot::KeySlot;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Errors produced by the key layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// No key has been bound to the store yet.
    #[error("encryption key not initialised")]
    NotInitialized,

    /// Key material is empty or whitespace only.
    #[error("encryption key must not be empty")]
    EmptyKey,

    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("application secret must not be empty")]
    EmptySecret,
}

/// Key material used as the PBKDF2 password for every field of a session.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wrap caller-supplied key material.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyKey`] if `material` is empty or whitespace.
    pub fn new(material: impl Into<String>) -> Result<Self, KeyError> {
        let material = material.into();
        if material.trim().is_empty() {
            return Err(KeyError::EmptyKey);
        }
        Ok(Self(material))
    }

    /// Derive the key of one user: `base64(HMAC-SHA256(app_secret, user_id))`.
    ///
    /// Deterministic, so the same user gets the same key on every sign-in and
    /// can read back what earlier sessions stored.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyUserId`] or [`KeyError::EmptySecret`] for
    /// empty inputs.
    pub fn for_user(user_id: &str, app_secret: &str) -> Result<Self, KeyError> {
        if user_id.trim().is_empty() {
            return Err(KeyError::EmptyUserId);
        }
        if app_secret.trim().is_empty() {
            return Err(KeyError::EmptySecret);
        }
        // HMAC accepts keys of any length.
        let mut mac =
            HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|_| KeyError::EmptySecret)?;
        mac.update(user_id.as_bytes());
        Ok(Self(STANDARD.encode(mac.finalize().into_bytes())))
    }

    /// Borrow the raw key material.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}
