//! Error classification shared across crates.

use thiserror::Error;

/// How a caller is expected to treat a failure.
///
/// - [`ErrorClass::Contract`]: the caller broke an API contract (e.g. used a
///   store before giving it a key). Fix the code; never retry.
/// - [`ErrorClass::Recoverable`]: wrong key, corrupted or unexpected data.
///   The caller decides whether to surface it, skip the record, or re-key.
/// - [`ErrorClass::Fatal`]: the crypto provider itself failed.
/// - [`ErrorClass::Backend`]: the document store failed; retry policy belongs
///   to the store client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Contract,
    Recoverable,
    Fatal,
    Backend,
}

impl ErrorClass {
    /// Short machine-readable code (e.g. `"contract"`), suitable for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorClass::Contract => "contract",
            ErrorClass::Recoverable => "recoverable",
            ErrorClass::Fatal => "fatal",
            ErrorClass::Backend => "backend",
        }
    }

    /// Returns `true` if the process cannot sensibly continue the operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorClass::Contract | ErrorClass::Fatal)
    }
}

/// A stored field value does not match the wire protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The value carries a known `kind` discriminant but an invalid body.
    #[error("malformed {kind} value: {reason}")]
    Malformed { kind: String, reason: String },
}
