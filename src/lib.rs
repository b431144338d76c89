pub mod access;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod notify;
pub mod persistence;
pub mod session;

pub use access::{can_edit, can_toggle_lock, Actor, Guarded, Role};
pub use command::{Change, Command, CommandKind, EntityKey, EntityRef};
pub use config::{ConfigError, EditorConfig};
pub use error::{EditorError, FlushError, HistoryError, StoreError};
pub use history::{
    CommandHistory, FileKeyValueStore, HistoryKeys, InMemoryKeyValueStore, KeyValueStore,
    LiveState,
};
pub use model::{
    Atlas, Coordinates, District, DistrictView, Media, MediaType, Period, Point, Province,
    Viewport,
};
pub use notify::{Notifier, Toast, ToastLevel};
pub use persistence::{BlobStore, DocumentStore, InMemoryBlobStore, InMemoryDocumentStore};
pub use session::{
    DistrictDraft, EditorSession, FlushReport, ProvinceDraft, StagedUpload, UploadTarget,
};

// Toasts are broadcast on this emitter when the `emitter` feature is on.
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
