//! Transient user notifications ("toasts").
//!
//! Toasts are fire-and-forget: raising one never fails, and each is
//! dismissed automatically once its time-to-live has elapsed. With the
//! `emitter` feature every toast is also broadcast as a JSON string on the
//! [`TOAST_EVENT`] channel of an [`EventEmitter`](event_emitter_rs::EventEmitter).

use std::time::{Duration, SystemTime};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

pub const TOAST_EVENT: &str = "toast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
    pub raised_at: SystemTime,
    pub expires_at: SystemTime,
}

pub struct Notifier {
    ttl: Duration,
    toasts: Vec<Toast>,
    next_id: u64,
    #[cfg(feature = "emitter")]
    emitter: EventEmitter,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Notifier {
            ttl,
            toasts: Vec::new(),
            next_id: 1,
            #[cfg(feature = "emitter")]
            emitter: EventEmitter::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raise a toast now. Returns its id.
    pub fn notify(&mut self, level: ToastLevel, message: impl Into<String>) -> u64 {
        self.notify_at(level, message, SystemTime::now())
    }

    pub fn notify_at(
        &mut self,
        level: ToastLevel,
        message: impl Into<String>,
        now: SystemTime,
    ) -> u64 {
        let toast = Toast {
            id: self.next_id,
            level,
            message: message.into(),
            raised_at: now,
            expires_at: now + self.ttl,
        };
        self.next_id += 1;

        self.broadcast(&toast);

        let id = toast.id;
        self.toasts.push(toast);
        id
    }

    #[cfg(feature = "emitter")]
    fn broadcast(&mut self, toast: &Toast) {
        if let Ok(payload) = serde_json::to_string(toast) {
            self.emitter.emit(TOAST_EVENT, payload);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn broadcast(&mut self, _toast: &Toast) {}

    /// Register a listener called (on a background thread) for every toast.
    #[cfg(feature = "emitter")]
    pub fn on_toast<F>(&mut self, listener: F)
    where
        F: Fn(Toast) + Send + Sync + 'static,
    {
        self.emitter.on(TOAST_EVENT, move |payload: String| {
            if let Ok(toast) = serde_json::from_str::<Toast>(&payload) {
                listener(toast);
            }
        });
    }

    /// Toasts still visible at `now`; expired ones are dropped.
    pub fn visible_at(&mut self, now: SystemTime) -> &[Toast] {
        self.toasts.retain(|toast| toast.expires_at > now);
        &self.toasts
    }

    pub fn visible(&mut self) -> &[Toast] {
        self.visible_at(SystemTime::now())
    }

    /// Dismiss a toast early. Returns false when it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Most recently raised toast that has not been pruned.
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}
