//! AES-256-GCM encryption of individual string payloads under a password.
//!
//! Every call to [`encrypt`] draws a fresh 16-byte salt and a fresh 12-byte IV
//! from the OS CSPRNG. The AES key is derived per call with
//! PBKDF2-HMAC-SHA256 over `(password, salt)`, so an IV is never reused under
//! the same key.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::WireEnvelope;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the PBKDF2 salt.
pub const SALT_LEN: usize = 16;

/// PBKDF2 iteration count. Changing it breaks every stored envelope.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key material must not be empty.
    #[error("encryption password must not be empty")]
    EmptyPassword,

    /// The envelope could not be decoded (bad base64, wrong IV or salt length).
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(&'static str),

    /// Authentication failed: wrong password, corrupted or tampered data.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// The AEAD primitive itself failed.
    #[error("crypto provider failure: {0}")]
    Crypto(&'static str),
}

/// A decoded encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
    /// Raw IV bytes.
    pub iv: [u8; IV_LEN],
    /// Raw key-derivation salt bytes.
    pub salt: [u8; SALT_LEN],
}

impl Envelope {
    /// Encode to the base64 transport form.
    pub fn to_wire(&self) -> WireEnvelope {
        WireEnvelope {
            ciphertext: STANDARD.encode(&self.ciphertext),
            iv: STANDARD.encode(self.iv),
            salt: STANDARD.encode(self.salt),
        }
    }

    /// Decode the base64 transport form.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidEnvelope`] if any part is not valid
    /// base64 or the IV / salt have the wrong length.
    pub fn from_wire(wire: &WireEnvelope) -> Result<Self, CipherError> {
        let ciphertext = STANDARD
            .decode(&wire.ciphertext)
            .map_err(|_| CipherError::InvalidEnvelope("ciphertext is not valid base64"))?;
        let iv = decode_fixed::<IV_LEN>(&wire.iv, "iv is not valid base64", "iv must be 12 bytes")?;
        let salt = decode_fixed::<SALT_LEN>(
            &wire.salt,
            "salt is not valid base64",
            "salt must be 16 bytes",
        )?;
        Ok(Self {
            ciphertext,
            iv,
            salt,
        })
    }
}

fn decode_fixed<const N: usize>(
    b64: &str,
    bad_base64: &'static str,
    bad_length: &'static str,
) -> Result<[u8; N], CipherError> {
    let bytes = STANDARD
        .decode(b64)
        .map_err(|_| CipherError::InvalidEnvelope(bad_base64))?;
    bytes
        .try_into()
        .map_err(|_| CipherError::InvalidEnvelope(bad_length))
}

/// An AES-256-GCM key derived from a password.
///
/// Only usable for sealing and opening payloads; the key bytes are not
/// reachable from outside this module.
pub struct DerivedKey(Aes256Gcm);

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

impl DerivedKey {
    fn seal(&self, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.0
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|_| CipherError::Crypto("aes-256-gcm encryption failed"))
    }

    fn open(&self, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.0
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| CipherError::Decryption)
    }
}

/// Derive an AES-256 key from `password` and `salt` with PBKDF2-HMAC-SHA256.
///
/// The same `(password, salt)` pair always yields the same key.
///
/// # Errors
///
/// Returns [`CipherError::EmptyPassword`] if `password` is empty.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<DerivedKey, CipherError> {
    if password.is_empty() {
        return Err(CipherError::EmptyPassword);
    }
    let mut raw = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, raw.as_mut());
    Aes256Gcm::new_from_slice(raw.as_ref())
        .map(DerivedKey)
        .map_err(|_| CipherError::Crypto("derived key has invalid length"))
}

/// Encrypt `plaintext` under `password`.
///
/// # Errors
///
/// Returns [`CipherError::EmptyPassword`] for an empty password and
/// [`CipherError::Crypto`] if the AEAD primitive fails.
pub fn encrypt(plaintext: &str, password: &str) -> Result<Envelope, CipherError> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt)?;
    let ciphertext = key.seal(&iv, plaintext.as_bytes())?;

    Ok(Envelope {
        ciphertext,
        iv,
        salt,
    })
}

/// Decrypt an [`Envelope`] back to the original string.
///
/// # Errors
///
/// Returns [`CipherError::Decryption`] if authentication fails (wrong
/// password, tampered ciphertext, IV or salt) or the plaintext is not UTF-8.
pub fn decrypt(envelope: &Envelope, password: &str) -> Result<String, CipherError> {
    let key = derive_key(password, &envelope.salt)?;
    let plaintext = key.open(&envelope.iv, &envelope.ciphertext)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::Decryption)
}
