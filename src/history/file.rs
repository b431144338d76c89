use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::store::KeyValueStore;

/// Key-value store persisted as a single JSON object on disk.
///
/// Writes go to a sibling temp file (the target name plus `.tmp`), synced to
/// disk and then renamed over the target, so a multi-key `set_many` is
/// all-or-nothing.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileKeyValueStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(StoreError::Unavailable(format!(
                "{}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |err: std::io::Error| {
            StoreError::Unavailable(format!("{}: {}", self.path.display(), err))
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.temp_path();
        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut all = self.read_all()?;
        for (key, value) in entries {
            all.insert(key.to_string(), value.clone());
        }
        self.write_all(&all)
    }
}
