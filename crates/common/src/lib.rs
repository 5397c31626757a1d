//! Wire types and error classification shared across `fleet-vault` crates.

pub mod error;
pub mod protocol;

pub use error::{ErrorClass, ProtocolError};
pub use protocol::{Document, EncryptedValue, PayloadEncoding, SealedValue, WireEnvelope};
