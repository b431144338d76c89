//! Persistence collaborators - the managed document database and object
//! store the editor flushes to.
//!
//! Documents are addressed by a collection path plus a caller-assigned id,
//! so repeating a write during a retried flush is idempotent.

mod in_memory;

pub use in_memory::{InMemoryBlobStore, InMemoryDocumentStore};

use serde_json::Value;

use crate::error::StoreError;

/// Document database collaborator.
pub trait DocumentStore {
    /// All documents in a collection as `(id, record)` pairs.
    fn get_collection(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Create or replace a document.
    fn set_document(&self, path: &str, id: &str, record: Value) -> Result<(), StoreError>;

    /// Merge top-level fields into an existing document.
    fn update_document(&self, path: &str, id: &str, partial: Value) -> Result<(), StoreError>;
}

/// Object store collaborator.
pub trait BlobStore {
    /// Store `bytes` at `path` and return a durable URL for them.
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

impl<D: DocumentStore + ?Sized> DocumentStore for &D {
    fn get_collection(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError> {
        (**self).get_collection(path)
    }

    fn set_document(&self, path: &str, id: &str, record: Value) -> Result<(), StoreError> {
        (**self).set_document(path, id, record)
    }

    fn update_document(&self, path: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        (**self).update_document(path, id, partial)
    }
}

impl<B: BlobStore + ?Sized> BlobStore for &B {
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        (**self).upload_blob(path, bytes)
    }
}
