//! [`KeySlot`]: the key state owned by one secured store.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::{KeyError, SessionKey};

/// Shared slot holding the session key of one store.
///
/// Starts empty and moves to initialised on the first [`KeySlot::set`]. There
/// is no way back to empty; a later `set` replaces the key (e.g. on re-login).
///
/// Wraps an `Arc<RwLock<Option<SessionKey>>>` so that:
/// - Any number of in-flight operations can read the key concurrently.
/// - A replacement takes the write lock, so a concurrent reader sees either
///   the old key or the new one, never a torn value.
#[derive(Clone, Debug, Default)]
pub struct KeySlot {
    inner: Arc<RwLock<Option<SessionKey>>>,
}

impl KeySlot {
    /// Create a new, empty [`KeySlot`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that is already initialised with `key`.
    pub fn with_key(key: SessionKey) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(key))),
        }
    }

    /// Returns `true` if a key has been set.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Set (or replace) the key. Returns `true` if a previous key was replaced.
    pub async fn set(&self, key: SessionKey) -> bool {
        let mut lock = self.inner.write().await;
        lock.replace(key).is_some()
    }

    /// Clone the current key.
    ///
    /// Callers take one snapshot per operation and drop it when done.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotInitialized`] if no key has been set yet.
    pub async fn current(&self) -> Result<SessionKey, KeyError> {
        let lock = self.inner.read().await;
        lock.as_ref().cloned().ok_or(KeyError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(material: &str) -> SessionKey {
        SessionKey::new(material).unwrap()
    }

    #[tokio::test]
    async fn initially_not_ready() {
        let slot = KeySlot::new();
        assert!(!slot.is_ready().await);
        assert!(matches!(slot.current().await, Err(KeyError::NotInitialized)));
    }

    #[tokio::test]
    async fn set_and_retrieve() {
        let slot = KeySlot::new();
        assert!(!slot.set(key("k1")).await);
        assert!(slot.is_ready().await);
        assert_eq!(slot.current().await.unwrap().expose(), "k1");
    }

    #[tokio::test]
    async fn with_key_starts_initialised() {
        let slot = KeySlot::with_key(key("k1"));
        assert!(slot.is_ready().await);
    }

    #[tokio::test]
    async fn set_replaces_key() {
        let slot = KeySlot::new();
        slot.set(key("k1")).await;
        assert!(slot.set(key("k2")).await);
        assert_eq!(slot.current().await.unwrap().expose(), "k2");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let slot = KeySlot::new();
        let other = slot.clone();
        slot.set(key("k1")).await;
        assert!(other.is_ready().await);
    }
}
