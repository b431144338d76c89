//! In-memory collaborators for tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::StoreError;

use super::{BlobStore, DocumentStore};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Document store backed by a map of collections.
///
/// Collections list their documents ordered by id. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_document(&self, path: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("document read"))?;
        Ok(collections.get(path).and_then(|docs| docs.get(id)).cloned())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get_collection(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("document read"))?;
        Ok(collections
            .get(path)
            .map(|docs| {
                docs.iter()
                    .map(|(id, value)| (id.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn set_document(&self, path: &str, id: &str, record: Value) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("document write"))?;
        collections
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    fn update_document(&self, path: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        let Value::Object(fields) = partial else {
            return Err(StoreError::Rejected {
                path: path.to_string(),
                id: id.to_string(),
                reason: "partial record must be an object".into(),
            });
        };

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("document write"))?;
        let existing = collections
            .get_mut(path)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
                id: id.to_string(),
            })?;

        match existing {
            Value::Object(target) => {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
            other => *other = Value::Object(fields),
        }
        Ok(())
    }
}

/// Object store that keeps blobs in memory and hands out `memory://` URLs.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::LockPoisoned("blob read"))?;
        Ok(blobs.get(path).cloned())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::LockPoisoned("blob read"))?;
        Ok(blobs.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl BlobStore for InMemoryBlobStore {
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::LockPoisoned("blob write"))?;
        blobs.insert(path.to_string(), bytes.to_vec());
        Ok(format!("memory://{}", path))
    }
}
