use tracing::{debug, info, warn};

use crate::access::{can_edit, Actor};
use crate::command::{Change, Command, EntityKey, EntityRef};
use crate::config::EditorConfig;
use crate::error::{EditorError, StoreError};
use crate::history::{KeyValueStore, LiveState};
use crate::model::Atlas;
use crate::notify::ToastLevel;
use crate::persistence::{BlobStore, DocumentStore};

use super::EditorSession;

/// What a completed save did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Commands written to the document store.
    pub written: usize,
    /// Commands dropped because the actor may no longer edit their target.
    pub skipped: usize,
}

impl<K, D, B> EditorSession<K, D, B>
where
    K: KeyValueStore,
    D: DocumentStore,
    B: BlobStore,
{
    /// Write every applied command to the document store, oldest first.
    ///
    /// Stops at the first failed write and keeps the whole queue so the save
    /// can be retried; writes are keyed by id, so repeating the ones that
    /// already landed is harmless.
    pub fn save(&mut self) -> Result<FlushReport, EditorError> {
        self.cancel_drag();
        let result = self.try_save();
        self.report(result)
    }

    fn try_save(&mut self) -> Result<FlushReport, EditorError> {
        let EditorSession {
            config,
            actor,
            atlas,
            remote,
            history,
            documents,
            notifier,
            ..
        } = self;

        let mut report = FlushReport::default();
        history.flush(|command| {
            if write_command(config, actor, atlas, remote, documents, command)? {
                report.written += 1;
            } else {
                report.skipped += 1;
            }
            Ok::<(), StoreError>(())
        })?;

        if report.skipped > 0 {
            // Skipped changes never reached the store; show what it holds.
            let selection = atlas.selection().cloned();
            *atlas = remote.clone();
            atlas.select(selection);
        }

        info!(
            actor = %actor.id,
            written = report.written,
            skipped = report.skipped,
            "changes saved"
        );
        notifier.notify(ToastLevel::Success, "Changes saved");
        Ok(report)
    }
}

/// Re-check the gate against the stored copy of whatever the command's
/// edit was authorized on. A new district was authorized on its province,
/// so it is checked there: the stored province first, then the pending one
/// when the province itself has not been saved yet.
fn may_write(
    actor: &Actor,
    pending: &Atlas,
    remote: &Atlas,
    command: &Command,
    target: &EntityKey,
) -> bool {
    let privileged = actor.is_privileged();
    if let Change::AddDistrict {
        province_id,
        new_state,
    } = &command.change
    {
        return match remote
            .province(province_id)
            .or_else(|| pending.province(province_id))
        {
            Some(province) => can_edit(province, &actor.id, privileged),
            None => can_edit(new_state, &actor.id, privileged),
        };
    }
    match remote.get(target) {
        Some(stored) => can_edit(&stored, &actor.id, privileged),
        None => can_edit(&command.new_state(), &actor.id, privileged),
    }
}

/// Persist one command. Returns false when the gate check fails and the
/// command is skipped instead.
fn write_command<D: DocumentStore>(
    config: &EditorConfig,
    actor: &Actor,
    pending: &Atlas,
    remote: &mut Atlas,
    documents: &D,
    command: &Command,
) -> Result<bool, StoreError> {
    let target = command.target();
    if !may_write(actor, pending, remote, command, &target) {
        warn!(
            sequence_id = command.sequence_id,
            kind = %command.kind(),
            target_key = %target,
            actor = %actor.id,
            "skipping command the actor may no longer edit"
        );
        return Ok(false);
    }

    let (path, id) = match &target {
        EntityKey::Province(id) => (config.province_path(), id.as_str()),
        EntityKey::District {
            province_id,
            district_id,
        } => (config.district_path(province_id), district_id.as_str()),
    };
    let record = match command.new_state() {
        EntityRef::Province(province) => serde_json::to_value(province)?,
        EntityRef::District { district, .. } => serde_json::to_value(district)?,
    };

    if command.kind().is_add() {
        documents.set_document(&path, id, record)?;
    } else {
        documents.update_document(&path, id, record)?;
    }
    remote.apply(command);

    debug!(
        sequence_id = command.sequence_id,
        kind = %command.kind(),
        path = %path,
        id = %id,
        "command written"
    );
    Ok(true)
}
