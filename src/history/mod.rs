//! Command history - a linear undo/redo sequence with a cursor, mirrored to
//! durable key-value storage on every change.
//!
//! The cursor (`history_index`) ranges over `[-1, len - 1]`. Commands at or
//! before it are applied; commands after it can be redone. Recording after
//! an undo discards the redo tail.
//!
//! ## Example
//!
//! ```ignore
//! let mut history = CommandHistory::open(store, HistoryKeys::default())?;
//! history.record(change)?;
//! history.undo(&mut atlas)?;
//! history.redo(&mut atlas)?;
//! history.flush(|command| write(command))?;
//! ```

mod file;
mod store;

pub use file::FileKeyValueStore;
pub use store::{InMemoryKeyValueStore, KeyValueStore};

use tracing::debug;

use crate::command::{Change, Command};
use crate::config::EditorConfig;
use crate::error::{FlushError, HistoryError};

/// State the history reverts and re-applies commands against.
pub trait LiveState {
    /// Make the command's new state live.
    fn apply(&mut self, command: &Command);

    /// Make the command's previous state live; for add kinds, remove the
    /// created entity.
    fn revert(&mut self, command: &Command);
}

/// Storage keys for the command sequence and the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryKeys {
    pub commands: String,
    pub cursor: String,
}

impl HistoryKeys {
    pub fn from_config(config: &EditorConfig) -> Self {
        HistoryKeys {
            commands: config.history_key.clone(),
            cursor: config.cursor_key.clone(),
        }
    }
}

impl Default for HistoryKeys {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

pub struct CommandHistory<S> {
    store: S,
    keys: HistoryKeys,
    commands: Vec<Command>,
    /// Number of applied commands, i.e. `history_index + 1`.
    applied: usize,
    next_sequence: u64,
}

impl<S: KeyValueStore> CommandHistory<S> {
    /// Load the history persisted under `keys`. Missing keys yield an empty
    /// history; a cursor out of range is clamped.
    pub fn open(store: S, keys: HistoryKeys) -> Result<Self, HistoryError> {
        let commands: Vec<Command> = match store.get(&keys.commands)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| HistoryError::Corrupt {
                key: keys.commands.clone(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        let cursor: i64 = match store.get(&keys.cursor)? {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                HistoryError::Corrupt {
                    key: keys.cursor.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => -1,
        };

        let applied = (cursor + 1).clamp(0, commands.len() as i64) as usize;
        let next_sequence = commands.iter().map(|c| c.sequence_id).max().unwrap_or(0) + 1;

        debug!(
            commands = commands.len(),
            cursor = applied as i64 - 1,
            "history opened"
        );

        Ok(CommandHistory {
            store,
            keys,
            commands,
            applied,
            next_sequence,
        })
    }

    /// Append a command after the cursor, discarding any redo tail.
    pub fn record(&mut self, change: Change) -> Result<&Command, HistoryError> {
        let redo_tail = self.commands.split_off(self.applied);
        let sequence_id = self.next_sequence;

        self.commands.push(Command::new(sequence_id, change));
        self.applied = self.commands.len();
        self.next_sequence += 1;

        if let Err(err) = self.persist() {
            self.commands.pop();
            self.commands.extend(redo_tail);
            self.applied -= 1;
            self.next_sequence = sequence_id;
            return Err(err);
        }

        let command = &self.commands[self.applied - 1];
        debug!(
            sequence_id,
            kind = %command.kind(),
            cursor = self.history_index(),
            discarded = redo_tail.len(),
            "command recorded"
        );
        Ok(command)
    }

    /// Revert the command at the cursor. `Ok(None)` when there is nothing to undo.
    pub fn undo<L>(&mut self, live: &mut L) -> Result<Option<&Command>, HistoryError>
    where
        L: LiveState + ?Sized,
    {
        if self.applied == 0 {
            return Ok(None);
        }

        self.applied -= 1;
        if let Err(err) = self.persist_cursor() {
            self.applied += 1;
            return Err(err);
        }

        let command = &self.commands[self.applied];
        live.revert(command);
        debug!(
            sequence_id = command.sequence_id,
            kind = %command.kind(),
            cursor = self.applied as i64 - 1,
            "command undone"
        );
        Ok(Some(command))
    }

    /// Re-apply the command after the cursor. `Ok(None)` when there is nothing to redo.
    pub fn redo<L>(&mut self, live: &mut L) -> Result<Option<&Command>, HistoryError>
    where
        L: LiveState + ?Sized,
    {
        if self.applied >= self.commands.len() {
            return Ok(None);
        }

        self.applied += 1;
        if let Err(err) = self.persist_cursor() {
            self.applied -= 1;
            return Err(err);
        }

        let command = &self.commands[self.applied - 1];
        live.apply(command);
        debug!(
            sequence_id = command.sequence_id,
            kind = %command.kind(),
            cursor = self.applied as i64 - 1,
            "command redone"
        );
        Ok(Some(command))
    }

    /// Hand every applied command, oldest first, to `persist`.
    ///
    /// Stops at the first failure and leaves the history untouched. When all
    /// writes succeed the whole sequence (redo tail included) is cleared and
    /// the cursor reset to -1. Returns the number of commands written.
    pub fn flush<F, E>(&mut self, mut persist: F) -> Result<usize, FlushError<E>>
    where
        F: FnMut(&Command) -> Result<(), E>,
        E: std::error::Error + 'static,
    {
        let mut written = 0;
        for command in &self.commands[..self.applied] {
            if let Err(source) = persist(command) {
                return Err(FlushError::Write {
                    sequence_id: command.sequence_id,
                    written,
                    source,
                });
            }
            written += 1;
        }

        self.clear().map_err(FlushError::History)?;
        Ok(written)
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.store.set_many(&[
            (self.keys.commands.as_str(), "[]".to_string()),
            (self.keys.cursor.as_str(), "-1".to_string()),
        ])?;
        self.commands.clear();
        self.applied = 0;
        Ok(())
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let commands = serde_json::to_string(&self.commands).map_err(|e| {
            HistoryError::Corrupt {
                key: self.keys.commands.clone(),
                reason: e.to_string(),
            }
        })?;
        self.store.set_many(&[
            (self.keys.commands.as_str(), commands),
            (self.keys.cursor.as_str(), self.history_index().to_string()),
        ])?;
        Ok(())
    }

    fn persist_cursor(&self) -> Result<(), HistoryError> {
        self.store
            .set(&self.keys.cursor, self.history_index().to_string())?;
        Ok(())
    }
}

impl<S> CommandHistory<S> {
    /// Cursor position: -1 when nothing is applied.
    pub fn history_index(&self) -> i64 {
        self.applied as i64 - 1
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Applied commands awaiting a flush, oldest first.
    pub fn pending(&self) -> &[Command] {
        &self.commands[..self.applied]
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
