//! `fleet-vault`: client-side field-level encryption for fleet records.
//!
//! Sensitive customer and vehicle fields are encrypted before they reach the
//! document database and decrypted after they are read back.
//!
//! Typical wiring at sign-in:
//! 1. Load [`Config`] from environment variables.
//! 2. Initialise logging with [`telemetry::init`].
//! 3. Build a [`SecuredStore`] over the application's [`DocumentStore`] and
//!    bind the user's key with [`SecuredStore::initialize_for_user`].

pub mod config;
pub mod crypto;
pub mod docstore;
pub mod key;
pub mod records;
pub mod store;
pub mod telemetry;

pub use crate::config::Config;
pub use crate::crypto::{CipherError, DecryptMode, FieldError};
pub use crate::docstore::{DocumentStore, MemoryDocumentStore};
pub use crate::key::{KeyError, SessionKey};
pub use crate::records::{Customer, CustomerPatch, SecuredRecord, Vehicle, VehiclePatch};
pub use crate::store::{SecuredStore, StoreError, StoreOptions};
