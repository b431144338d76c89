use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{info, warn};

use super::Actor;

/// Sessions issued by the credential collaborator last 30 days.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential service unavailable: {0}")]
    Unavailable(String),
}

/// External credential service: username-or-email plus password in,
/// actor identity out.
pub trait Authenticator {
    fn authenticate(&self, identifier: &str, password: &str) -> Result<Actor, AuthError>;
}

/// An authenticated editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub actor: Actor,
    pub issued_at: SystemTime,
    pub max_age: Duration,
}

impl Session {
    pub fn start<A: Authenticator + ?Sized>(
        authenticator: &A,
        identifier: &str,
        password: &str,
    ) -> Result<Self, AuthError> {
        match authenticator.authenticate(identifier, password) {
            Ok(actor) => {
                info!(actor = %actor.id, role = %actor.role, "session started");
                Ok(Session {
                    actor,
                    issued_at: SystemTime::now(),
                    max_age: SESSION_MAX_AGE,
                })
            }
            Err(err) => {
                warn!(identifier, error = %err, "authentication failed");
                Err(err)
            }
        }
    }

    pub fn expires_at(&self) -> SystemTime {
        self.issued_at + self.max_age
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at()
    }
}
