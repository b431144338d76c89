use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;

/// Durable client-side key-value storage for the command history.
///
/// `set_many` must land all entries together or none of them, so that
/// the command sequence and the cursor never disagree after a restart.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        (**self).set_many(entries)
    }
}

/// In-memory key-value store.
///
/// Clone-friendly: clones share the same storage, which lets a test
/// "restart" a session against the same durable state.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("key-value read"))?;
        Ok(storage.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("key-value write"))?;
        for (key, value) in entries {
            storage.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}
