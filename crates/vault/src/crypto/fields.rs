//! Encryption and decryption of a whitelisted subset of a document's fields.

use std::borrow::Cow;

use common::{
    Document, EncryptedValue, PayloadEncoding, ProtocolError, SealedValue, WireEnvelope,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::cipher::{self, CipherError, Envelope};

/// How [`decrypt_fields`] treats a listed field that holds an untagged value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptMode {
    /// Every non-null listed field must be a tagged [`SealedValue`].
    #[default]
    Strict,
    /// Untagged legacy envelopes are decrypted; any other untagged value is
    /// returned unchanged. For data written before values were tagged.
    Lenient,
}

/// Errors produced while transforming a document's fields.
///
/// Every variant names the offending field.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("failed to encrypt field `{field}`")]
    Encryption {
        field: String,
        #[source]
        source: CipherError,
    },

    #[error("failed to decrypt field `{field}`")]
    Decryption {
        field: String,
        #[source]
        source: CipherError,
    },

    /// A structured value could not be serialised, or a `json` payload did
    /// not parse after decryption.
    #[error("failed to (de)serialise field `{field}`")]
    Serialization {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// Strict mode found a value without a `kind` discriminant.
    #[error("field `{field}` holds an untagged value")]
    Untagged { field: String },

    #[error("field `{field}` holds a malformed sealed value")]
    Malformed {
        field: String,
        #[source]
        source: ProtocolError,
    },
}

impl FieldError {
    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            FieldError::Encryption { field, .. }
            | FieldError::Decryption { field, .. }
            | FieldError::Serialization { field, .. }
            | FieldError::Untagged { field }
            | FieldError::Malformed { field, .. } => field,
        }
    }
}

/// Encrypt the listed fields of `document` under `password`.
///
/// Strings are encrypted as-is; any other value is serialised to JSON first.
/// Fields that are absent, `null` or the empty string, and fields not listed,
/// are copied unchanged. The input document is never modified.
///
/// # Errors
///
/// Returns the first [`FieldError`] encountered.
pub fn encrypt_fields(
    document: &Document,
    fields: &[&str],
    password: &str,
) -> Result<Document, FieldError> {
    let mut out = document.clone();

    for &field in fields {
        let (plaintext, encoding) = match document.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(Value::String(s)) => (Cow::Borrowed(s.as_str()), PayloadEncoding::Text),
            Some(other) => {
                let json = serde_json::to_string(other).map_err(|source| {
                    FieldError::Serialization {
                        field: field.to_owned(),
                        source,
                    }
                })?;
                (Cow::Owned(json), PayloadEncoding::Json)
            }
        };

        let envelope =
            cipher::encrypt(&plaintext, password).map_err(|source| FieldError::Encryption {
                field: field.to_owned(),
                source,
            })?;

        let sealed = SealedValue::Encrypted(EncryptedValue::new(envelope.to_wire(), encoding));
        let stored = serde_json::to_value(&sealed).map_err(|source| FieldError::Serialization {
            field: field.to_owned(),
            source,
        })?;
        out.insert(field.to_owned(), stored);
    }

    Ok(out)
}

/// Decrypt the listed fields of `document` under `password`.
///
/// All-or-nothing: the first field that fails aborts the whole call and no
/// partially decrypted document is returned.
///
/// # Errors
///
/// Returns [`FieldError::Decryption`] on authentication failure,
/// [`FieldError::Untagged`] in [`DecryptMode::Strict`] for untagged values,
/// and [`FieldError::Malformed`] / [`FieldError::Serialization`] for bodies
/// that do not match their declared shape.
pub fn decrypt_fields(
    document: &Document,
    fields: &[&str],
    password: &str,
    mode: DecryptMode,
) -> Result<Document, FieldError> {
    let mut out = document.clone();

    for &field in fields {
        let value = match document.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(v) => v,
        };

        let sealed = SealedValue::parse(value).map_err(|source| FieldError::Malformed {
            field: field.to_owned(),
            source,
        })?;

        let plain = match sealed {
            Some(SealedValue::Encrypted(enc)) => {
                open(field, &enc.envelope(), Some(enc.encoding), password)?
            }
            Some(SealedValue::Plain { value }) => value,
            None => match mode {
                DecryptMode::Strict => {
                    return Err(FieldError::Untagged {
                        field: field.to_owned(),
                    })
                }
                DecryptMode::Lenient => match WireEnvelope::from_legacy(value) {
                    Some(wire) => open(field, &wire, None, password)?,
                    None => continue,
                },
            },
        };

        out.insert(field.to_owned(), plain);
    }

    Ok(out)
}

/// Decrypt one envelope and rebuild the field value.
///
/// `encoding` is `None` for legacy envelopes, whose payload is parsed as JSON
/// only when it yields an object or array.
fn open(
    field: &str,
    wire: &WireEnvelope,
    encoding: Option<PayloadEncoding>,
    password: &str,
) -> Result<Value, FieldError> {
    let text = Envelope::from_wire(wire)
        .and_then(|envelope| cipher::decrypt(&envelope, password))
        .map_err(|source| {
            warn!(field, error = %source, "field decryption failed");
            FieldError::Decryption {
                field: field.to_owned(),
                source,
            }
        })?;

    match encoding {
        Some(PayloadEncoding::Text) => Ok(Value::String(text)),
        Some(PayloadEncoding::Json) => {
            serde_json::from_str(&text).map_err(|source| FieldError::Serialization {
                field: field.to_owned(),
                source,
            })
        }
        None => match serde_json::from_str::<Value>(&text) {
            Ok(v @ (Value::Object(_) | Value::Array(_))) => Ok(v),
            _ => Ok(Value::String(text)),
        },
    }
}
