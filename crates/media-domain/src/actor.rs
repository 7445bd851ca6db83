//! Roles cerrados y actor que invoca transiciones.
//!
//! Los roles son un enum cerrado: la tabla de permisos vive en el registro de
//! estados (media-core) y se consulta en un solo lugar, nunca con strings
//! sueltos repartidos por capa externa.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::DomainError;

/// Identificador de usuario. La gestión de cuentas es un colaborador externo;
/// aquí sólo circula el id.
pub type UserId = Uuid;

/// Conjunto cerrado de roles del sistema.
///
/// La forma string (snake_case) es la que se persiste y se compara de manera
/// exacta, sensible a mayúsculas: `Role::from_str` no normaliza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProgramManager,
    Producer,
    Editor,
    MusicCurator,
    Employee,
}

impl Role {
    pub const ALL: [Role; 6] = [Role::Admin,
                                Role::ProgramManager,
                                Role::Producer,
                                Role::Editor,
                                Role::MusicCurator,
                                Role::Employee];

    /// Forma estable para almacenamiento y logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProgramManager => "program_manager",
            Role::Producer => "producer",
            Role::Editor => "editor",
            Role::MusicCurator => "music_curator",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL.iter()
                 .find(|r| r.as_str() == s)
                 .copied()
                 .ok_or_else(|| DomainError::UnknownRole(s.to_string()))
    }
}

/// Usuario (con rol) que solicita una transición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
