//! Persisted shapes of sensitive field values.
//!
//! These types define what the document database actually holds for an
//! encrypted field. Every consumer of the stored data (this workspace, older
//! clients, migration tooling) must agree on them byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// One stored record: a flat JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Name of the discriminant key carried by every [`SealedValue`].
pub const KIND_KEY: &str = "kind";

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Base64 transport form of an encrypted payload.
///
/// This is also the legacy on-disk shape: older clients stored exactly these
/// three fields, with no discriminant, directly in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireEnvelope {
    /// Standard base64 of the AEAD output (ciphertext + tag).
    pub ciphertext: String,
    /// Standard base64 of the 12-byte IV.
    pub iv: String,
    /// Standard base64 of the 16-byte key-derivation salt.
    pub salt: String,
}

impl WireEnvelope {
    /// Recognise an untagged legacy envelope.
    ///
    /// Matches only an object with exactly the keys `ciphertext`, `iv` and
    /// `salt`, all strings. Anything else returns `None`.
    pub fn from_legacy(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if map.len() != 3 {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

// ---------------------------------------------------------------------------
// Tagged field values
// ---------------------------------------------------------------------------

/// How the decrypted text of an [`EncryptedValue`] must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// The plaintext is the field's string value.
    Text,
    /// The plaintext is the canonical JSON serialisation of a structured value.
    Json,
}

/// An encrypted field value, tagged with its payload encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
    pub encoding: PayloadEncoding,
}

impl EncryptedValue {
    /// Wrap a transport envelope with its payload encoding.
    pub fn new(envelope: WireEnvelope, encoding: PayloadEncoding) -> Self {
        Self {
            ciphertext: envelope.ciphertext,
            iv: envelope.iv,
            salt: envelope.salt,
            encoding,
        }
    }

    /// The transport envelope carried by this value.
    pub fn envelope(&self) -> WireEnvelope {
        WireEnvelope {
            ciphertext: self.ciphertext.clone(),
            iv: self.iv.clone(),
            salt: self.salt.clone(),
        }
    }
}

/// Persisted form of a sensitive field, discriminated by `kind`.
///
/// ```text
/// {"kind":"encrypted","ciphertext":"..","iv":"..","salt":"..","encoding":"text"}
/// {"kind":"plain","value":<any JSON>}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SealedValue {
    /// Ciphertext produced by the field cipher.
    Encrypted(EncryptedValue),
    /// A value explicitly marked as not encrypted.
    Plain { value: Value },
}

impl SealedValue {
    /// Parse a stored field value.
    ///
    /// Returns `Ok(None)` for untagged values: anything that is not an object
    /// whose `kind` is `"encrypted"` or `"plain"`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if the value carries a known
    /// `kind` but the remaining fields do not match it.
    pub fn parse(value: &Value) -> Result<Option<Self>, ProtocolError> {
        let kind = match value.get(KIND_KEY).and_then(Value::as_str) {
            Some(k @ ("encrypted" | "plain")) => k,
            _ => return Ok(None),
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ProtocolError::Malformed {
                kind: kind.to_owned(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_envelope() -> WireEnvelope {
        WireEnvelope {
            ciphertext: "Y2lwaGVy".into(),
            iv: "AAAAAAAAAAAAAAAA".into(),
            salt: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
        }
    }

    #[test]
    fn encrypted_value_serialises_with_kind_tag() {
        let sealed = SealedValue::Encrypted(EncryptedValue::new(
            sample_envelope(),
            PayloadEncoding::Text,
        ));
        let v = serde_json::to_value(&sealed).unwrap();
        assert_eq!(v["kind"], "encrypted");
        assert_eq!(v["encoding"], "text");
        assert_eq!(v["iv"], "AAAAAAAAAAAAAAAA");
        assert_eq!(SealedValue::parse(&v).unwrap(), Some(sealed));
    }

    #[test]
    fn plain_value_serialises_with_kind_tag() {
        let sealed = SealedValue::Plain {
            value: json!({"iban": "DE00"}),
        };
        let v = serde_json::to_value(&sealed).unwrap();
        assert_eq!(v, json!({"kind": "plain", "value": {"iban": "DE00"}}));
        assert_eq!(SealedValue::parse(&v).unwrap(), Some(sealed));
    }

    #[test]
    fn parse_ignores_untagged_values() {
        assert_eq!(SealedValue::parse(&json!("a@b.com")).unwrap(), None);
        assert_eq!(SealedValue::parse(&json!({"kind": "sedan"})).unwrap(), None);
        assert_eq!(SealedValue::parse(&json!({"kind": 3})).unwrap(), None);
    }

    #[test]
    fn parse_rejects_malformed_tagged_value() {
        let err = SealedValue::parse(&json!({"kind": "encrypted", "iv": "x"})).unwrap_err();
        assert!(err.to_string().contains("encrypted"));
    }

    #[test]
    fn legacy_envelope_requires_exact_shape() {
        let env = sample_envelope();
        let exact = serde_json::to_value(&env).unwrap();
        assert_eq!(WireEnvelope::from_legacy(&exact), Some(env));

        let extra = json!({"ciphertext": "a", "iv": "b", "salt": "c", "note": "d"});
        assert_eq!(WireEnvelope::from_legacy(&extra), None);

        let missing = json!({"ciphertext": "a", "iv": "b"});
        assert_eq!(WireEnvelope::from_legacy(&missing), None);

        let wrong_type = json!({"ciphertext": "a", "iv": 1, "salt": "c"});
        assert_eq!(WireEnvelope::from_legacy(&wrong_type), None);
    }
}
