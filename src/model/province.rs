use serde::{Deserialize, Serialize};

use super::geometry::Coordinates;
use super::Record;

/// Top-level region of the map.
///
/// Districts are not embedded; they live under their province in the
/// `Atlas` and in their own document collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Province {
    pub id: String,
    pub name: String,
    pub localized_name: String,
    pub created_by: String,
    pub lock: bool,
    pub version: u64,
    pub coordinates: Coordinates,
    pub color: String,
    pub description: String,
}

impl Record for Province {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
