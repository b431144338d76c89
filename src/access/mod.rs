//! Access control - who may mutate which entity.
//!
//! The gate is a pure predicate over the entity's owner and lock flag. A
//! privileged actor may edit anything; everyone else may edit only what
//! they created, and only while it is unlocked. Toggling the lock itself
//! is reserved for the privileged actor.

mod actor;
mod session;

pub use actor::{Actor, Role};
pub use session::{AuthError, Authenticator, Session, SESSION_MAX_AGE};

use crate::command::EntityRef;
use crate::model::{District, Province};

/// Ownership and lock state the gate decides on.
pub trait Guarded {
    fn created_by(&self) -> &str;

    fn is_locked(&self) -> bool;
}

impl Guarded for Province {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn is_locked(&self) -> bool {
        self.lock
    }
}

impl Guarded for District {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn is_locked(&self) -> bool {
        self.lock
    }
}

impl Guarded for EntityRef<'_> {
    fn created_by(&self) -> &str {
        match self {
            EntityRef::Province(province) => province.created_by(),
            EntityRef::District { district, .. } => district.created_by(),
        }
    }

    fn is_locked(&self) -> bool {
        match self {
            EntityRef::Province(province) => province.is_locked(),
            EntityRef::District { district, .. } => district.is_locked(),
        }
    }
}

/// Whether `actor_id` may mutate `entity`.
pub fn can_edit<G: Guarded + ?Sized>(entity: &G, actor_id: &str, privileged: bool) -> bool {
    if privileged {
        return true;
    }
    entity.created_by() == actor_id && !entity.is_locked()
}

/// Whether the actor may set or clear an entity's lock.
pub fn can_toggle_lock(privileged: bool) -> bool {
    privileged
}
