//! Blob storage abstraction and implementations
//!
//! The bot keeps its counter and lexicon as named objects in one bucket.
//! This module defines the small read/write surface the bot needs and the
//! clients that provide it.

use async_trait::async_trait;

use crate::error::StorageError;

pub mod gcs;

// The in-memory store is available in all builds so integration tests can
// drive the poster without network access.
pub mod memory;

pub use gcs::GcsBucket;
pub use memory::MemoryStore;

/// Read/write access to named text blobs in a single bucket.
///
/// Implementations distinguish a missing object (`StorageError::NotFound`)
/// from an unreachable or failing backend (`StorageError::Unavailable`);
/// callers decide which of the two is corrupted state.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download an object as UTF-8 text.
    async fn download(&self, object: &str) -> Result<String, StorageError>;

    /// Upload UTF-8 text, replacing the object if it exists.
    async fn upload(&self, object: &str, body: &str) -> Result<(), StorageError>;

    /// Lowercase identifier for the backend (e.g. "gcs", "memory")
    fn name(&self) -> &str;
}
