//! Editor session - turns user gestures into recorded commands and flushes
//! them to the persistence collaborators on save.
//!
//! The session is the one context object handlers receive: it owns the live
//! [`Atlas`], the durable [`CommandHistory`], the collaborators and the
//! notifier. Live state is the desired state; the document store catches up
//! on the next successful [`save`](EditorSession::save).
//!
//! ## Example
//!
//! ```ignore
//! let mut session = EditorSession::open(config, actor, kv, documents, blobs)?;
//! session.begin_drag("north", "harbor", Point::new(10.0, 10.0))?;
//! session.drag_to(Point::new(40.0, 25.0));
//! session.end_drag()?;
//! session.undo()?;
//! session.save()?;
//! ```

mod drag;
mod edit;
mod flush;
mod upload;

pub use edit::{DistrictDraft, ProvinceDraft};
pub use flush::FlushReport;
pub use upload::{StagedUpload, UploadTarget};

use tracing::{error, info, warn};

use crate::access::{can_edit, Actor, Guarded};
use crate::command::{Change, EntityKey};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::{CommandHistory, HistoryKeys, KeyValueStore, LiveState};
use crate::model::{Atlas, Viewport};
use crate::notify::{Notifier, Toast, ToastLevel};
use crate::persistence::{BlobStore, DocumentStore};

use drag::DragState;

pub struct EditorSession<K, D, B> {
    config: EditorConfig,
    actor: Actor,
    /// Desired state: the last known stored state plus every pending command.
    atlas: Atlas,
    /// Last known stored state, used for the access check at flush time.
    remote: Atlas,
    history: CommandHistory<K>,
    documents: D,
    blobs: B,
    notifier: Notifier,
    viewport: Viewport,
    drag: Option<DragState>,
}

impl<K, D, B> EditorSession<K, D, B>
where
    K: KeyValueStore,
    D: DocumentStore,
    B: BlobStore,
{
    /// Load the stored atlas, open the durable history and re-apply the
    /// commands that were recorded but never flushed.
    pub fn open(
        config: EditorConfig,
        actor: Actor,
        store: K,
        documents: D,
        blobs: B,
    ) -> Result<Self, EditorError> {
        let remote = Atlas::load(&documents, &config)?;
        let history = CommandHistory::open(store, HistoryKeys::from_config(&config))?;

        let mut atlas = remote.clone();
        for command in history.pending() {
            atlas.apply(command);
        }

        info!(
            actor = %actor.id,
            provinces = atlas.provinces().len(),
            pending = history.pending().len(),
            "editor session opened"
        );

        Ok(EditorSession {
            notifier: Notifier::new(config.toast_ttl),
            config,
            actor,
            atlas,
            remote,
            history,
            documents,
            blobs,
            viewport: Viewport::default(),
            drag: None,
        })
    }

    /// Reload the stored atlas and re-apply pending commands on top of it.
    pub fn refresh(&mut self) -> Result<(), EditorError> {
        let result = self.reload();
        self.report(result)
    }

    fn reload(&mut self) -> Result<(), EditorError> {
        self.cancel_drag();
        let remote = Atlas::load(&self.documents, &self.config)?;
        let selection = self.atlas.selection().cloned();

        let mut atlas = remote.clone();
        for command in self.history.pending() {
            atlas.apply(command);
        }
        atlas.select(selection);

        self.remote = remote;
        self.atlas = atlas;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<Option<u64>, EditorError> {
        self.cancel_drag();
        let result = self
            .history
            .undo(&mut self.atlas)
            .map(|command| command.map(|c| c.sequence_id))
            .map_err(EditorError::from);
        self.report(result)
    }

    pub fn redo(&mut self) -> Result<Option<u64>, EditorError> {
        self.cancel_drag();
        let result = self
            .history
            .redo(&mut self.atlas)
            .map(|command| command.map(|c| c.sequence_id))
            .map_err(EditorError::from);
        self.report(result)
    }

    /// Whether the session's actor may currently edit `key`.
    pub fn can_edit(&self, key: &EntityKey) -> bool {
        self.atlas
            .get(key)
            .map(|entity| can_edit(&entity, &self.actor.id, self.actor.is_privileged()))
            .unwrap_or(false)
    }

    /// Record `change` and make its new state live. Returns the sequence id.
    fn record(&mut self, change: Change) -> Result<u64, EditorError> {
        let command = self.history.record(change)?;
        self.atlas.apply(command);
        Ok(command.sequence_id)
    }

    fn authorize<G: Guarded + ?Sized>(
        &self,
        entity: &G,
        key: &EntityKey,
    ) -> Result<(), EditorError> {
        if can_edit(entity, &self.actor.id, self.actor.is_privileged()) {
            Ok(())
        } else {
            Err(EditorError::Authorization {
                actor: self.actor.id.clone(),
                target: key.to_string(),
            })
        }
    }

    /// Surface a failure as an error toast; the session stays usable.
    fn report<T>(&mut self, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(err) = &result {
            match err {
                EditorError::Validation(_)
                | EditorError::Authorization { .. }
                | EditorError::NotFound(_) => {
                    warn!(actor = %self.actor.id, error = %err, "edit rejected")
                }
                _ => error!(actor = %self.actor.id, error = %err, "editor operation failed"),
            }
            self.notifier.notify(ToastLevel::Error, err.to_string());
        }
        result
    }
}

impl<K, D, B> EditorSession<K, D, B> {
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn history(&self) -> &CommandHistory<K> {
        &self.history
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn select(&mut self, key: Option<EntityKey>) {
        self.atlas.select(key);
    }

    /// Wheel zoom, clamped to the configured range. Returns the new zoom.
    pub fn zoom(&mut self, factor: f64) -> f64 {
        self.viewport
            .zoom_by(factor, self.config.min_zoom, self.config.max_zoom)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    /// Currently visible toasts.
    pub fn toasts(&mut self) -> &[Toast] {
        self.notifier.visible()
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
