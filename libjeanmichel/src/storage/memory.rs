//! In-memory blob store for testing
//!
//! Backs the poster in tests without network access. Handles are cheap
//! clones sharing one object map, so a test can keep a handle and inspect
//! what the code under test wrote. Failure injection covers the two
//! storage error paths the poster distinguishes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::storage::BlobStore;

/// Shared in-memory object map with optional failure injection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, String>>>,
    fail_downloads: bool,
    fail_uploads: bool,
    download_count: Arc<Mutex<usize>>,
    upload_count: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, builder-style.
    pub fn with_object(self, object: &str, body: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(object.to_string(), body.to_string());
        self
    }

    /// Make every download fail with `StorageError::Unavailable`.
    pub fn fail_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Make every upload fail with `StorageError::Unavailable`.
    pub fn fail_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    /// Current body of an object, if present.
    pub fn object(&self, object: &str) -> Option<String> {
        self.objects.lock().unwrap().get(object).cloned()
    }

    pub fn download_count(&self) -> usize {
        *self.download_count.lock().unwrap()
    }

    pub fn upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn download(&self, object: &str) -> Result<String, StorageError> {
        *self.download_count.lock().unwrap() += 1;

        if self.fail_downloads {
            return Err(StorageError::Unavailable(
                "Simulated download failure".to_string(),
            ));
        }

        self.objects
            .lock()
            .unwrap()
            .get(object)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(object.to_string()))
    }

    async fn upload(&self, object: &str, body: &str) -> Result<(), StorageError> {
        *self.upload_count.lock().unwrap() += 1;

        if self.fail_uploads {
            return Err(StorageError::Unavailable(
                "Simulated upload failure".to_string(),
            ));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(object.to_string(), body.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_seeded_object() {
        let store = MemoryStore::new().with_object("counter", "5");
        assert_eq!(store.download("counter").await.unwrap(), "5");
        assert_eq!(store.download_count(), 1);
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let store = MemoryStore::new();
        let result = store.download("counter").await;

        match result {
            Err(StorageError::NotFound(object)) => assert_eq!(object, "counter"),
            _ => panic!("Expected not found error"),
        }
    }

    #[tokio::test]
    async fn test_upload_visible_through_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.upload("counter", "6").await.unwrap();

        assert_eq!(handle.object("counter"), Some("6".to_string()));
        assert_eq!(handle.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new().with_object("counter", "5").fail_uploads();

        assert!(store.download("counter").await.is_ok());
        assert!(store.upload("counter", "6").await.is_err());
        // Failed upload leaves the object untouched
        assert_eq!(store.object("counter"), Some("5".to_string()));
    }
}
