use std::collections::HashMap;

use tracing::debug;

use crate::command::{Command, EntityKey, EntityRef};
use crate::config::EditorConfig;
use crate::error::StoreError;
use crate::history::LiveState;
use crate::persistence::DocumentStore;

use super::{District, Province, Record};

/// Live, in-memory entity state the editor mutates optimistically.
///
/// Provinces keep insertion order; districts are grouped by province id and
/// keep insertion order within a province.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atlas {
    provinces: Vec<Province>,
    districts: HashMap<String, Vec<District>>,
    selection: Option<EntityKey>,
}

impl Atlas {
    pub fn new() -> Self {
        Atlas::default()
    }

    /// Build the live state from the document store.
    pub fn load<D: DocumentStore>(
        documents: &D,
        config: &EditorConfig,
    ) -> Result<Self, StoreError> {
        let mut atlas = Atlas::new();

        for (id, value) in documents.get_collection(&config.province_path())? {
            let mut province: Province = serde_json::from_value(value)?;
            province.id = id;
            atlas.upsert_province(province);
        }

        let province_ids: Vec<String> = atlas.provinces.iter().map(|p| p.id.clone()).collect();
        for province_id in province_ids {
            for (id, value) in documents.get_collection(&config.district_path(&province_id))? {
                let mut district: District = serde_json::from_value(value)?;
                district.id = id;
                atlas.upsert_district(&province_id, district);
            }
        }

        debug!(
            provinces = atlas.provinces.len(),
            districts = atlas.districts.values().map(Vec::len).sum::<usize>(),
            "atlas loaded"
        );
        Ok(atlas)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, id: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.id == id)
    }

    pub fn districts(&self, province_id: &str) -> &[District] {
        self.districts
            .get(province_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn district(&self, province_id: &str, district_id: &str) -> Option<&District> {
        self.districts(province_id).iter().find(|d| d.id == district_id)
    }

    /// Mutable access for transient edits that are not recorded, such as
    /// the live position during a drag.
    pub fn district_mut(&mut self, province_id: &str, district_id: &str) -> Option<&mut District> {
        self.districts
            .get_mut(province_id)?
            .iter_mut()
            .find(|d| d.id == district_id)
    }

    pub fn get<'a>(&'a self, key: &'a EntityKey) -> Option<EntityRef<'a>> {
        match key {
            EntityKey::Province(id) => self.province(id).map(EntityRef::Province),
            EntityKey::District {
                province_id,
                district_id,
            } => self
                .district(province_id, district_id)
                .map(|district| EntityRef::District {
                    province_id: province_id.as_str(),
                    district,
                }),
        }
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace (by id) a province.
    pub fn upsert_province(&mut self, province: Province) {
        match self.provinces.iter_mut().find(|p| p.id == province.id) {
            Some(existing) => *existing = province,
            None => self.provinces.push(province),
        }
    }

    /// Insert or replace (by id) a district within its province.
    pub fn upsert_district(&mut self, province_id: &str, district: District) {
        let districts = self.districts.entry(province_id.to_string()).or_default();
        match districts.iter_mut().find(|d| d.id == district.id) {
            Some(existing) => *existing = district,
            None => districts.push(district),
        }
    }

    /// Remove a province together with its districts.
    pub fn remove_province(&mut self, id: &str) -> Option<Province> {
        let index = self.provinces.iter().position(|p| p.id == id)?;
        let removed = self.provinces.remove(index);
        self.districts.remove(id);

        let selected_here = match &self.selection {
            Some(EntityKey::Province(selected)) => selected == id,
            Some(EntityKey::District { province_id, .. }) => province_id == id,
            None => false,
        };
        if selected_here {
            self.selection = None;
        }
        Some(removed)
    }

    pub fn remove_district(&mut self, province_id: &str, district_id: &str) -> Option<District> {
        let districts = self.districts.get_mut(province_id)?;
        let index = districts.iter().position(|d| d.id == district_id)?;
        let removed = districts.remove(index);

        if self.selection == Some(EntityKey::district(province_id, district_id)) {
            self.selection = None;
        }
        Some(removed)
    }

    pub fn selection(&self) -> Option<&EntityKey> {
        self.selection.as_ref()
    }

    /// Select an entity; selecting something absent clears the selection.
    pub fn select(&mut self, key: Option<EntityKey>) {
        self.selection = key.filter(|key| self.contains(key));
    }

    /// Write a snapshot into the live state without lowering its version.
    fn restore(&mut self, snapshot: EntityRef<'_>) {
        let live_version = self.get(&snapshot.key()).map(|live| match live {
            EntityRef::Province(p) => p.version(),
            EntityRef::District { district, .. } => district.version(),
        });

        match snapshot {
            EntityRef::Province(province) => {
                let mut province = province.clone();
                province.set_version(province.version().max(live_version.unwrap_or(0)));
                self.upsert_province(province);
            }
            EntityRef::District {
                province_id,
                district,
            } => {
                let mut district = district.clone();
                district.set_version(district.version().max(live_version.unwrap_or(0)));
                self.upsert_district(province_id, district);
            }
        }
    }
}

impl LiveState for Atlas {
    fn apply(&mut self, command: &Command) {
        self.restore(command.new_state());
    }

    fn revert(&mut self, command: &Command) {
        match command.previous_state() {
            Some(previous) => self.restore(previous),
            None => match command.target() {
                EntityKey::Province(id) => {
                    self.remove_province(&id);
                }
                EntityKey::District {
                    province_id,
                    district_id,
                } => {
                    self.remove_district(&province_id, &district_id);
                }
            },
        }
    }
}
