use crate::access::can_toggle_lock;
use crate::command::{Change, EntityKey};
use crate::error::EditorError;
use crate::history::KeyValueStore;
use crate::model::{slugify, Coordinates, District, Period, Province};
use crate::persistence::{BlobStore, DocumentStore};

use super::EditorSession;

/// Form input for a new province.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvinceDraft {
    pub name: String,
    pub localized_name: String,
    pub coordinates: Coordinates,
    pub color: String,
    pub description: String,
}

/// Form input for a new district.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictDraft {
    pub name: String,
    pub localized_name: String,
    pub coordinates: Coordinates,
    pub base_color: String,
    pub cultural_significance: String,
    pub visitor_tips: String,
}

/// Check required names and derive the document id.
fn validate_names(name: &str, localized_name: &str) -> Result<String, EditorError> {
    if name.trim().is_empty() {
        return Err(EditorError::Validation("name is required".into()));
    }
    if localized_name.trim().is_empty() {
        return Err(EditorError::Validation("localized name is required".into()));
    }
    Ok(slugify(name))
}

impl<K, D, B> EditorSession<K, D, B>
where
    K: KeyValueStore,
    D: DocumentStore,
    B: BlobStore,
{
    /// Create a province owned by the session's actor. Returns its id.
    pub fn add_province(&mut self, draft: ProvinceDraft) -> Result<String, EditorError> {
        let result = self.try_add_province(draft);
        self.report(result)
    }

    fn try_add_province(&mut self, draft: ProvinceDraft) -> Result<String, EditorError> {
        let id = validate_names(&draft.name, &draft.localized_name)?;
        if self.atlas.province(&id).is_some() {
            return Err(EditorError::Validation(format!(
                "province {} already exists",
                id
            )));
        }

        let province = Province {
            id: id.clone(),
            name: draft.name.trim().to_string(),
            localized_name: draft.localized_name.trim().to_string(),
            created_by: self.actor.id.clone(),
            lock: false,
            version: 1,
            coordinates: draft.coordinates,
            color: draft.color,
            description: draft.description,
        };
        self.record(Change::AddProvince {
            new_state: province,
        })?;
        Ok(id)
    }

    /// Create a district inside an editable province. Returns its id.
    pub fn add_district(
        &mut self,
        province_id: &str,
        draft: DistrictDraft,
    ) -> Result<String, EditorError> {
        let result = self.try_add_district(province_id, draft);
        self.report(result)
    }

    fn try_add_district(
        &mut self,
        province_id: &str,
        draft: DistrictDraft,
    ) -> Result<String, EditorError> {
        let id = validate_names(&draft.name, &draft.localized_name)?;
        let province = self
            .atlas
            .province(province_id)
            .ok_or_else(|| EditorError::NotFound(format!("province {}", province_id)))?;
        self.authorize(province, &EntityKey::Province(province_id.to_string()))?;

        if self.atlas.district(province_id, &id).is_some() {
            return Err(EditorError::Validation(format!(
                "district {} already exists in province {}",
                id, province_id
            )));
        }

        let district = District {
            id: id.clone(),
            name: draft.name.trim().to_string(),
            localized_name: draft.localized_name.trim().to_string(),
            created_by: self.actor.id.clone(),
            lock: false,
            version: 1,
            coordinates: draft.coordinates,
            base_color: draft.base_color,
            historical_periods: Vec::new(),
            map_image_url: None,
            cultural_significance: draft.cultural_significance,
            visitor_tips: draft.visitor_tips,
        };
        self.record(Change::AddDistrict {
            province_id: province_id.to_string(),
            new_state: district,
        })?;
        Ok(id)
    }

    /// Apply one committed field edit to a province.
    ///
    /// Records exactly one command, or none when `edit` changed nothing.
    pub fn edit_province<F>(&mut self, id: &str, edit: F) -> Result<Option<u64>, EditorError>
    where
        F: FnOnce(&mut Province),
    {
        let result = self.try_edit_province(id, edit, false);
        self.report(result)
    }

    fn try_edit_province<F>(
        &mut self,
        id: &str,
        edit: F,
        lock_change: bool,
    ) -> Result<Option<u64>, EditorError>
    where
        F: FnOnce(&mut Province),
    {
        let key = EntityKey::Province(id.to_string());
        let previous = self
            .atlas
            .province(id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(key.to_string()))?;
        if !lock_change {
            self.authorize(&previous, &key)?;
        }

        let mut next = previous.clone();
        edit(&mut next);
        check_immutable(&key, &previous.id, &next.id, previous.lock, next.lock, lock_change)?;
        next.version = previous.version;
        if next == previous {
            return Ok(None);
        }

        next.version = previous.version + 1;
        self.record(Change::UpdateProvince {
            new_state: next,
            previous_state: previous,
        })
        .map(Some)
    }

    /// Apply one committed field edit to a district.
    ///
    /// Records exactly one command, or none when `edit` changed nothing.
    pub fn edit_district<F>(
        &mut self,
        province_id: &str,
        district_id: &str,
        edit: F,
    ) -> Result<Option<u64>, EditorError>
    where
        F: FnOnce(&mut District),
    {
        let result = self.try_edit_district(province_id, district_id, edit, false);
        self.report(result)
    }

    fn try_edit_district<F>(
        &mut self,
        province_id: &str,
        district_id: &str,
        edit: F,
        lock_change: bool,
    ) -> Result<Option<u64>, EditorError>
    where
        F: FnOnce(&mut District),
    {
        let key = EntityKey::district(province_id, district_id);
        let previous = self
            .atlas
            .district(province_id, district_id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(key.to_string()))?;
        if !lock_change {
            self.authorize(&previous, &key)?;
        }

        let mut next = previous.clone();
        edit(&mut next);
        check_immutable(&key, &previous.id, &next.id, previous.lock, next.lock, lock_change)?;
        next.version = previous.version;
        if next == previous {
            return Ok(None);
        }

        next.version = previous.version + 1;
        self.record(Change::UpdateDistrict {
            province_id: province_id.to_string(),
            new_state: next,
            previous_state: previous,
        })
        .map(Some)
    }

    /// Set or clear an entity's lock. Only the privileged actor may do this;
    /// the change is an ordinary undoable update.
    pub fn set_lock(&mut self, key: &EntityKey, locked: bool) -> Result<Option<u64>, EditorError> {
        let result = if can_toggle_lock(self.actor.is_privileged()) {
            match key {
                EntityKey::Province(id) => {
                    self.try_edit_province(id, |p| p.lock = locked, true)
                }
                EntityKey::District {
                    province_id,
                    district_id,
                } => self.try_edit_district(province_id, district_id, |d| d.lock = locked, true),
            }
        } else {
            Err(EditorError::Authorization {
                actor: self.actor.id.clone(),
                target: format!("lock on {}", key),
            })
        };
        self.report(result)
    }

    /// Attach a new historical period to a district. Eras are unique per district.
    pub fn add_period(
        &mut self,
        province_id: &str,
        district_id: &str,
        period: Period,
    ) -> Result<Option<u64>, EditorError> {
        let result = self.try_add_period(province_id, district_id, period);
        self.report(result)
    }

    fn try_add_period(
        &mut self,
        province_id: &str,
        district_id: &str,
        mut period: Period,
    ) -> Result<Option<u64>, EditorError> {
        period.era = period.era.trim().to_string();
        if period.era.is_empty() {
            return Err(EditorError::Validation("era is required".into()));
        }
        let district = self.atlas.district(province_id, district_id).ok_or_else(|| {
            EditorError::NotFound(EntityKey::district(province_id, district_id).to_string())
        })?;
        if district.period(&period.era).is_some() {
            return Err(EditorError::Validation(format!(
                "era {} already exists on district {}",
                period.era, district_id
            )));
        }

        self.try_edit_district(
            province_id,
            district_id,
            |d| d.historical_periods.push(period),
            false,
        )
    }
}

/// Ids never change; the lock flag only changes through `set_lock`.
fn check_immutable(
    key: &EntityKey,
    previous_id: &str,
    next_id: &str,
    previous_lock: bool,
    next_lock: bool,
    lock_change: bool,
) -> Result<(), EditorError> {
    if previous_id != next_id {
        return Err(EditorError::Validation(format!("{} id is immutable", key)));
    }
    if previous_lock != next_lock && !lock_change {
        return Err(EditorError::Validation(format!(
            "the lock on {} can only be changed with set_lock",
            key
        )));
    }
    Ok(())
}
