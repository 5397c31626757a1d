//! Seam to the external document database.
//!
//! The secured store only needs keyed get / overwrite / merge on named
//! collections. Hosted backends implement [`DocumentStore`] in the
//! application; [`MemoryDocumentStore`] is the in-process implementation.
//!
//! Backend errors are opaque [`anyhow::Error`]s and reach the caller
//! unchanged. No retries happen at this layer.

pub mod memory;

pub use memory::MemoryDocumentStore;

use anyhow::Result;
use async_trait::async_trait;
use common::Document;

/// Keyed document storage, grouped by collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document. `Ok(None)` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Write `document` under `id`, replacing any existing document entirely.
    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()>;

    /// Merge the top-level fields of `partial` into the existing document.
    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<()>;
}
