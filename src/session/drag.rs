use tracing::debug;

use crate::command::{Change, EntityKey};
use crate::error::EditorError;
use crate::history::KeyValueStore;
use crate::model::{District, Point};
use crate::persistence::{BlobStore, DocumentStore};

use super::EditorSession;

/// A drag in progress: where the pointer went down and the district as it
/// was at that moment.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DragState {
    province_id: String,
    start_pointer: Point,
    original: District,
}

impl<K, D, B> EditorSession<K, D, B>
where
    K: KeyValueStore,
    D: DocumentStore,
    B: BlobStore,
{
    /// Pointer down on a district. Any drag already in progress is cancelled.
    pub fn begin_drag(
        &mut self,
        province_id: &str,
        district_id: &str,
        pointer: Point,
    ) -> Result<(), EditorError> {
        self.cancel_drag();
        let result = self.try_begin_drag(province_id, district_id, pointer);
        self.report(result)
    }

    fn try_begin_drag(
        &mut self,
        province_id: &str,
        district_id: &str,
        pointer: Point,
    ) -> Result<(), EditorError> {
        let key = EntityKey::district(province_id, district_id);
        let original = self
            .atlas
            .district(province_id, district_id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(key.to_string()))?;
        self.authorize(&original, &key)?;

        self.atlas.select(Some(key));
        self.drag = Some(DragState {
            province_id: province_id.to_string(),
            start_pointer: pointer,
            original,
        });
        Ok(())
    }

    /// Pointer move. Updates the live coordinates only; nothing is recorded.
    /// Returns false when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };

        let (dx, dy) = self.viewport.to_canvas_delta(
            pointer.x - drag.start_pointer.x,
            pointer.y - drag.start_pointer.y,
        );
        let coordinates = drag.original.coordinates.translated(dx, dy);

        match self
            .atlas
            .district_mut(&drag.province_id, &drag.original.id)
        {
            Some(live) => {
                live.coordinates = coordinates;
                true
            }
            None => false,
        }
    }

    /// Pointer up. Records a single `updateDistrict` spanning the whole
    /// gesture, or nothing if the district did not move.
    pub fn end_drag(&mut self) -> Result<Option<u64>, EditorError> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        let result = self.try_end_drag(drag);
        self.report(result)
    }

    fn try_end_drag(&mut self, drag: DragState) -> Result<Option<u64>, EditorError> {
        let DragState {
            province_id,
            original,
            ..
        } = drag;
        let key = EntityKey::district(province_id.as_str(), original.id.as_str());

        let Some(live) = self.atlas.district(&province_id, &original.id).cloned() else {
            return Err(EditorError::NotFound(key.to_string()));
        };
        if live.coordinates == original.coordinates {
            return Ok(None);
        }

        let mut next = original.clone();
        next.coordinates = live.coordinates;
        next.version = original.version + 1;

        let result = self.record(Change::UpdateDistrict {
            province_id: province_id.clone(),
            new_state: next,
            previous_state: original.clone(),
        });
        if result.is_err() {
            self.atlas.upsert_district(&province_id, original);
        } else {
            debug!(target_key = %key, "drag committed");
        }
        result.map(Some)
    }

    /// Abandon a drag and put the district back where it started.
    /// Returns false when no drag was in progress.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(live) = self
            .atlas
            .district_mut(&drag.province_id, &drag.original.id)
        {
            live.coordinates = drag.original.coordinates;
        }
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
