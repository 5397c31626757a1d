//! Secured record store: encrypts sensitive fields on write, decrypts on read.
//!
//! # Responsibilities
//!
//! - Hold one session key per store instance ([`KeySlot`]); no global key.
//! - Refuse every data operation before a key is bound.
//! - Run each record type's declared sensitive fields through the field
//!   cipher, and never any other field.
//! - Perform exactly one document-store round trip per operation.
//!
//! PBKDF2 runs once per encrypted field, so cipher work is moved to Tokio's
//! blocking pool instead of stalling the async executor.

pub mod error;

pub use error::StoreError;

use common::Document;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::crypto::{self, DecryptMode};
use crate::docstore::DocumentStore;
use crate::key::{KeySlot, SessionKey};
use crate::records::{Customer, CustomerPatch, SecuredRecord, Vehicle, VehiclePatch};

/// Behaviour switches of a [`SecuredStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// How untagged values in sensitive fields are treated on read.
    pub decrypt_mode: DecryptMode,
}

/// Facade over a [`DocumentStore`] that keeps sensitive fields encrypted at rest.
#[derive(Clone, Debug)]
pub struct SecuredStore<S> {
    docs: S,
    key: KeySlot,
    options: StoreOptions,
}

impl<S: DocumentStore> SecuredStore<S> {
    /// Create a store with no key. Call [`SecuredStore::initialize`] before use.
    pub fn new(docs: S, options: StoreOptions) -> Self {
        Self {
            docs,
            key: KeySlot::new(),
            options,
        }
    }

    /// Create a store already bound to `key`.
    pub fn with_key(docs: S, key: SessionKey, options: StoreOptions) -> Self {
        Self {
            docs,
            key: KeySlot::with_key(key),
            options,
        }
    }

    /// Bind (or replace) the session key.
    ///
    /// Replacing the key does not re-encrypt documents written under the old
    /// one; they will fail to decrypt until the old key is restored.
    pub async fn initialize(&self, key: SessionKey) {
        let replaced = self.key.set(key).await;
        info!(replaced, "secured store key bound");
    }

    /// Derive the key of `user_id` (see [`SessionKey::for_user`]) and bind it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if either input is empty.
    pub async fn initialize_for_user(
        &self,
        user_id: &str,
        app_secret: &str,
    ) -> Result<(), StoreError> {
        let key = SessionKey::for_user(user_id, app_secret)?;
        self.initialize(key).await;
        Ok(())
    }

    /// Returns `true` once a key is bound.
    pub async fn is_initialized(&self) -> bool {
        self.key.is_ready().await
    }

    /// The underlying document store.
    pub fn documents(&self) -> &S {
        &self.docs
    }

    // -----------------------------------------------------------------------
    // Generic record operations
    // -----------------------------------------------------------------------

    /// Encrypt `record`'s sensitive fields and write it under its own id,
    /// replacing any existing document. Returns the id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotInitialized`] before a key is bound,
    /// [`StoreError::MissingId`] for an empty id, and cipher or backend errors.
    #[instrument(skip_all, fields(collection = R::COLLECTION, id = %record.id()))]
    pub async fn create<R: SecuredRecord>(&self, record: &R) -> Result<String, StoreError> {
        let key = self.key.current().await?;
        let id = record.id();
        if id.is_empty() {
            return Err(StoreError::MissingId);
        }

        let document = to_document(record)?;
        let sealed = seal(key, R::SENSITIVE_FIELDS, document).await?;
        self.docs
            .set(R::COLLECTION, id, sealed)
            .await
            .map_err(StoreError::Backend)?;

        debug!("record written");
        Ok(id.to_owned())
    }

    /// Read and decrypt one record. `Ok(None)` if no document has this id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotInitialized`] before a key is bound,
    /// [`StoreError::Field`] if any sensitive field fails to decrypt (no
    /// partial record is returned), [`StoreError::Schema`] if the decrypted
    /// document does not fit `R`, and backend errors.
    #[instrument(skip_all, fields(collection = R::COLLECTION, id = %id))]
    pub async fn get<R: SecuredRecord>(&self, id: &str) -> Result<Option<R>, StoreError> {
        let key = self.key.current().await?;

        let Some(document) = self
            .docs
            .get(R::COLLECTION, id)
            .await
            .map_err(StoreError::Backend)?
        else {
            debug!("record not found");
            return Ok(None);
        };

        let plain = open(key, R::SENSITIVE_FIELDS, document, self.options.decrypt_mode).await?;
        let record = serde_json::from_value(serde_json::Value::Object(plain)).map_err(|source| {
            StoreError::Schema {
                collection: R::COLLECTION,
                id: id.to_owned(),
                source,
            }
        })?;

        debug!("record read");
        Ok(Some(record))
    }

    /// Encrypt the sensitive fields present in `patch` and merge it into the
    /// stored document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotInitialized`] before a key is bound,
    /// [`StoreError::MissingId`] for an empty id, and cipher or backend errors
    /// (including a backend refusing to update a missing document).
    #[instrument(skip_all, fields(collection = R::COLLECTION, id = %id))]
    pub async fn update<R: SecuredRecord>(
        &self,
        id: &str,
        patch: &R::Patch,
    ) -> Result<(), StoreError> {
        let key = self.key.current().await?;
        if id.is_empty() {
            return Err(StoreError::MissingId);
        }

        let document = to_document(patch)?;
        let fields = document.len();
        let sealed = seal(key, R::SENSITIVE_FIELDS, document).await?;
        self.docs
            .update(R::COLLECTION, id, sealed)
            .await
            .map_err(StoreError::Backend)?;

        debug!(fields, "record updated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Customers
    // -----------------------------------------------------------------------

    pub async fn create_customer(&self, customer: &Customer) -> Result<String, StoreError> {
        self.create(customer).await
    }

    pub async fn get_customer(&self, id: &str) -> Result<Option<Customer>, StoreError> {
        self.get(id).await
    }

    pub async fn update_customer(&self, id: &str, patch: &CustomerPatch) -> Result<(), StoreError> {
        self.update::<Customer>(id, patch).await
    }

    // -----------------------------------------------------------------------
    // Vehicles
    // -----------------------------------------------------------------------

    pub async fn create_vehicle(&self, vehicle: &Vehicle) -> Result<String, StoreError> {
        self.create(vehicle).await
    }

    pub async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, StoreError> {
        self.get(id).await
    }

    pub async fn update_vehicle(&self, id: &str, patch: &VehiclePatch) -> Result<(), StoreError> {
        self.update::<Vehicle>(id, patch).await
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    serde_json::to_value(value)
        .and_then(serde_json::from_value)
        .map_err(StoreError::Serialization)
}

async fn seal(
    key: SessionKey,
    fields: &'static [&'static str],
    document: Document,
) -> Result<Document, StoreError> {
    let sealed = tokio::task::spawn_blocking(move || {
        crypto::encrypt_fields(&document, fields, key.expose())
    })
    .await??;
    Ok(sealed)
}

async fn open(
    key: SessionKey,
    fields: &'static [&'static str],
    document: Document,
    mode: DecryptMode,
) -> Result<Document, StoreError> {
    let plain = tokio::task::spawn_blocking(move || {
        crypto::decrypt_fields(&document, fields, key.expose(), mode)
    })
    .await??;
    Ok(plain)
}
