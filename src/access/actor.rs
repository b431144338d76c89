use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// The single reserved identity allowed to edit everything and to
    /// toggle locks.
    SuperAdmin,
    Editor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::SuperAdmin => f.write_str("super-admin"),
            Role::Editor => f.write_str("editor"),
        }
    }
}

/// An authenticated user of the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn editor(id: impl Into<String>) -> Self {
        let id = id.into();
        Actor::new(id.clone(), id, Role::Editor)
    }

    pub fn super_admin(id: impl Into<String>) -> Self {
        let id = id.into();
        Actor::new(id.clone(), id, Role::SuperAdmin)
    }

    pub fn is_privileged(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
