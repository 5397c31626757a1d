//! Errors surfaced by [`super::SecuredStore`].

use common::ErrorClass;
use thiserror::Error;

use crate::crypto::{CipherError, FieldError};
use crate::key::KeyError;

/// Errors produced by secured store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A data operation was attempted before a key was bound.
    #[error("secured store used before a key was bound")]
    NotInitialized,

    /// Key material could not be derived.
    #[error("invalid encryption key")]
    InvalidKey(#[source] KeyError),

    /// A record or update targeted an empty id.
    #[error("record id must not be empty")]
    MissingId,

    /// A sensitive field failed to encrypt or decrypt.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The decrypted document does not deserialise into the record type.
    #[error("stored document {collection}/{id} does not match the record schema")]
    Schema {
        collection: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record or patch could not be turned into a document.
    #[error("failed to serialise record")]
    Serialization(#[source] serde_json::Error),

    /// The blocking cipher task panicked or was cancelled.
    #[error("cipher task failed")]
    Task(#[from] tokio::task::JoinError),

    /// The document store failed; passed through unchanged.
    #[error(transparent)]
    Backend(anyhow::Error),
}

impl From<KeyError> for StoreError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::NotInitialized => StoreError::NotInitialized,
            other => StoreError::InvalidKey(other),
        }
    }
}

impl StoreError {
    /// How the caller should treat this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotInitialized
            | StoreError::InvalidKey(_)
            | StoreError::MissingId
            | StoreError::Serialization(_) => ErrorClass::Contract,
            StoreError::Field(FieldError::Encryption { source, .. }) => match source {
                CipherError::EmptyPassword => ErrorClass::Contract,
                _ => ErrorClass::Fatal,
            },
            StoreError::Field(_) | StoreError::Schema { .. } => ErrorClass::Recoverable,
            StoreError::Task(_) => ErrorClass::Fatal,
            StoreError::Backend(_) => ErrorClass::Backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_errors_map_to_store_errors() {
        assert!(matches!(
            StoreError::from(KeyError::NotInitialized),
            StoreError::NotInitialized
        ));
        assert!(matches!(
            StoreError::from(KeyError::EmptyUserId),
            StoreError::InvalidKey(KeyError::EmptyUserId)
        ));
    }

    #[test]
    fn classes() {
        assert_eq!(StoreError::NotInitialized.class(), ErrorClass::Contract);
        assert_eq!(StoreError::MissingId.class(), ErrorClass::Contract);
        assert_eq!(
            StoreError::Backend(anyhow::anyhow!("unavailable")).class(),
            ErrorClass::Backend
        );

        let decryption = StoreError::Field(FieldError::Decryption {
            field: "email".into(),
            source: CipherError::Decryption,
        });
        assert_eq!(decryption.class(), ErrorClass::Recoverable);

        let provider = StoreError::Field(FieldError::Encryption {
            field: "email".into(),
            source: CipherError::Crypto("aes-256-gcm encryption failed"),
        });
        assert_eq!(provider.class(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn failed_cipher_task_is_fatal() {
        let join_error = tokio::task::spawn_blocking(|| panic!("cipher worker died"))
            .await
            .unwrap_err();
        let e = StoreError::from(join_error);
        assert!(matches!(e, StoreError::Task(_)));
        assert_eq!(e.class(), ErrorClass::Fatal);
        assert!(e.class().is_fatal());
    }

    #[test]
    fn backend_errors_pass_through_unchanged() {
        let e = StoreError::Backend(anyhow::anyhow!("quota exceeded"));
        assert_eq!(e.to_string(), "quota exceeded");
    }

    #[test]
    fn field_errors_keep_field_name_in_message() {
        let e = StoreError::from(FieldError::Untagged {
            field: "phone".into(),
        });
        assert!(e.to_string().contains("phone"));
    }
}
