//! PBKDF2 + AES-256-GCM field encryption primitives.
//!
//! This module is intentionally free of storage and record-schema
//! dependencies. It provides the payload cipher and the whitelisted-field
//! helpers used by the secured store.
//!
//! # Stored field format
//!
//! ```text
//! {"kind":"encrypted","ciphertext":<b64>,"iv":<b64, 12 bytes>,"salt":<b64, 16 bytes>,"encoding":"text"|"json"}
//! ```

pub mod cipher;
pub mod fields;

pub use cipher::{CipherError, Envelope};
pub use fields::{decrypt_fields, encrypt_fields, DecryptMode, FieldError};
