//! Commands - the undo/redo unit.
//!
//! Every discrete edit is captured as a [`Change`] carrying the full
//! entity snapshot after the edit and, except for creations, the snapshot
//! before it. A [`Command`] wraps a change with its sequence id and time.
//!
//! Serialized layout (one element of the persisted history array):
//!
//! ```text
//! { "kind": "updateDistrict", "provinceId": "north",
//!   "newState": {...}, "previousState": {...},
//!   "sequenceId": 4, "timestamp": {...} }
//! ```

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::model::{District, Province};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    UpdateDistrict,
    UpdateProvince,
    AddProvince,
    AddDistrict,
    UploadMedia,
    UploadMapImage,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::UpdateDistrict => "updateDistrict",
            CommandKind::UpdateProvince => "updateProvince",
            CommandKind::AddProvince => "addProvince",
            CommandKind::AddDistrict => "addDistrict",
            CommandKind::UploadMedia => "uploadMedia",
            CommandKind::UploadMapImage => "uploadMapImage",
        }
    }

    /// Add kinds have no previous state; undoing them removes the entity.
    pub fn is_add(self) -> bool {
        matches!(self, CommandKind::AddProvince | CommandKind::AddDistrict)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an entity in the live state and in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Province(String),
    District {
        province_id: String,
        district_id: String,
    },
}

impl EntityKey {
    pub fn district(province_id: impl Into<String>, district_id: impl Into<String>) -> Self {
        EntityKey::District {
            province_id: province_id.into(),
            district_id: district_id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Province(id) => write!(f, "province {}", id),
            EntityKey::District {
                province_id,
                district_id,
            } => write!(f, "district {}/{}", province_id, district_id),
        }
    }
}

/// Borrowed view of an entity snapshot held by a command or the live state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Province(&'a Province),
    District {
        province_id: &'a str,
        district: &'a District,
    },
}

impl EntityRef<'_> {
    pub fn key(&self) -> EntityKey {
        match self {
            EntityRef::Province(province) => EntityKey::Province(province.id.clone()),
            EntityRef::District {
                province_id,
                district,
            } => EntityKey::district(*province_id, district.id.clone()),
        }
    }
}

/// One edit, typed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Change {
    UpdateDistrict {
        province_id: String,
        new_state: District,
        previous_state: District,
    },
    UpdateProvince {
        new_state: Province,
        previous_state: Province,
    },
    AddProvince {
        new_state: Province,
    },
    AddDistrict {
        province_id: String,
        new_state: District,
    },
    UploadMedia {
        province_id: String,
        era: String,
        new_state: District,
        previous_state: District,
    },
    UploadMapImage {
        province_id: String,
        new_state: District,
        previous_state: District,
    },
}

impl Change {
    pub fn kind(&self) -> CommandKind {
        match self {
            Change::UpdateDistrict { .. } => CommandKind::UpdateDistrict,
            Change::UpdateProvince { .. } => CommandKind::UpdateProvince,
            Change::AddProvince { .. } => CommandKind::AddProvince,
            Change::AddDistrict { .. } => CommandKind::AddDistrict,
            Change::UploadMedia { .. } => CommandKind::UploadMedia,
            Change::UploadMapImage { .. } => CommandKind::UploadMapImage,
        }
    }

    pub fn new_state(&self) -> EntityRef<'_> {
        match self {
            Change::UpdateProvince { new_state, .. } | Change::AddProvince { new_state } => {
                EntityRef::Province(new_state)
            }
            Change::UpdateDistrict {
                province_id,
                new_state,
                ..
            }
            | Change::AddDistrict {
                province_id,
                new_state,
            }
            | Change::UploadMedia {
                province_id,
                new_state,
                ..
            }
            | Change::UploadMapImage {
                province_id,
                new_state,
                ..
            } => EntityRef::District {
                province_id,
                district: new_state,
            },
        }
    }

    /// `None` exactly for add kinds.
    pub fn previous_state(&self) -> Option<EntityRef<'_>> {
        match self {
            Change::AddProvince { .. } | Change::AddDistrict { .. } => None,
            Change::UpdateProvince { previous_state, .. } => {
                Some(EntityRef::Province(previous_state))
            }
            Change::UpdateDistrict {
                province_id,
                previous_state,
                ..
            }
            | Change::UploadMedia {
                province_id,
                previous_state,
                ..
            }
            | Change::UploadMapImage {
                province_id,
                previous_state,
                ..
            } => Some(EntityRef::District {
                province_id,
                district: previous_state,
            }),
        }
    }

    pub fn target(&self) -> EntityKey {
        self.new_state().key()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub sequence_id: u64,
    pub timestamp: SystemTime,
    #[serde(flatten)]
    pub change: Change,
}

impl Command {
    pub fn new(sequence_id: u64, change: Change) -> Self {
        Command {
            sequence_id,
            timestamp: SystemTime::now(),
            change,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.change.kind()
    }

    pub fn target(&self) -> EntityKey {
        self.change.target()
    }

    pub fn new_state(&self) -> EntityRef<'_> {
        self.change.new_state()
    }

    pub fn previous_state(&self) -> Option<EntityRef<'_>> {
        self.change.previous_state()
    }
}
