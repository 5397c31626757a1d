//! In-memory [`DocumentStore`].

use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, Result};
use async_trait::async_trait;
use common::Document;
use tokio::sync::RwLock;

use super::DocumentStore;

type Collections = HashMap<String, HashMap<String, Document>>;

/// Process-local document store.
///
/// Cloning yields another handle to the same data, so a test can keep one
/// handle to inspect what a secured store wrote through another.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.inner
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let lock = self.inner.read().await;
        Ok(lock.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        let mut lock = self.inner.write().await;
        lock.entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<()> {
        let mut lock = self.inner.write().await;
        let Some(existing) = lock.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            bail!("document {collection}/{id} does not exist");
        };
        existing.extend(partial);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("customers", "nope").await.unwrap().is_none());
        assert_eq!(store.len("customers").await, 0);
    }

    #[tokio::test]
    async fn set_overwrites_entirely() {
        let store = MemoryDocumentStore::new();
        store.set("c", "1", doc(json!({"a": 1, "b": 2}))).await.unwrap();
        store.set("c", "1", doc(json!({"a": 3}))).await.unwrap();
        let got = store.get("c", "1").await.unwrap().unwrap();
        assert_eq!(got, doc(json!({"a": 3})));
        assert_eq!(store.len("c").await, 1);
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        store.set("c", "1", doc(json!({"a": 1, "b": 2}))).await.unwrap();
        store.update("c", "1", doc(json!({"b": 5, "c": 6}))).await.unwrap();
        let got = store.get("c", "1").await.unwrap().unwrap();
        assert_eq!(got, doc(json!({"a": 1, "b": 5, "c": 6})));
    }

    #[tokio::test]
    async fn update_of_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        assert!(store.update("c", "1", Document::new()).await.is_err());
    }

    #[tokio::test]
    async fn clones_share_data() {
        let store = MemoryDocumentStore::new();
        let handle = store.clone();
        store.set("c", "1", Document::new()).await.unwrap();
        assert!(handle.get("c", "1").await.unwrap().is_some());
    }
}
