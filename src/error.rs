use thiserror::Error;

use crate::config::ConfigError;

/// Failure reported by an external collaborator (document store, blob store,
/// or the durable key-value store backing the history).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document not found: {path}/{id}")]
    NotFound { path: String, id: String },
    #[error("write rejected for {path}/{id}: {reason}")]
    Rejected {
        path: String,
        id: String,
        reason: String,
    },
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serde(value.to_string())
    }
}

/// Failure reading or writing the durable command history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("history key {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Outcome of a flush that did not complete.
#[derive(Debug, Error)]
pub enum FlushError<E>
where
    E: std::error::Error + 'static,
{
    /// The write for `sequence_id` failed; `written` commands before it succeeded.
    #[error("write for command {sequence_id} failed after {written} successful writes: {source}")]
    Write {
        sequence_id: u64,
        written: usize,
        #[source]
        source: E,
    },
    /// Every write succeeded but clearing the local queue did not.
    #[error(transparent)]
    History(HistoryError),
}

/// Errors surfaced by the editor session.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{actor} is not allowed to modify {target}")]
    Authorization { actor: String, target: String },
    #[error("upload failed: {0}")]
    Transfer(String),
    #[error("saving command {sequence_id} failed: {source}")]
    Persistence {
        sequence_id: u64,
        #[source]
        source: StoreError,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<FlushError<StoreError>> for EditorError {
    fn from(value: FlushError<StoreError>) -> Self {
        match value {
            FlushError::Write {
                sequence_id,
                source,
                ..
            } => EditorError::Persistence {
                sequence_id,
                source,
            },
            FlushError::History(err) => EditorError::History(err),
        }
    }
}
