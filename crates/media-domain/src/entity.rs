//! Entidades gobernadas por el motor de workflow.
//!
//! `WorkflowEntity` es la vista mínima que el motor necesita: identidad, tipo,
//! dueño y `current_state`. Los campos de payload específicos de cada tipo
//! (rundowns, adjuntos de audio, etc.) quedan fuera del núcleo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::actor::UserId;
use crate::DomainError;

/// Tipos de entidad con ciclo de vida propio. Conjunto cerrado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Program,
    Episode,
    MusicSubmission,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Program, EntityType::Episode, EntityType::MusicSubmission];

    /// Forma estable para almacenamiento, logs y CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Program => "program",
            EntityType::Episode => "episode",
            EntityType::MusicSubmission => "music_submission",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL.iter()
                       .find(|t| t.as_str() == s)
                       .copied()
                       .ok_or_else(|| DomainError::UnknownEntityType(s.to_string()))
    }
}

/// Fila de entidad tal como la ve el motor.
///
/// Invariante: `current_state` debe coincidir con el `to_state` del registro
/// de historial más reciente de la entidad. Sólo el store de workflow escribe
/// este campo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntity {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub title: String,
    pub owner_user_id: UserId,
    pub current_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowEntity {
    /// `true` si el usuario es el dueño/creador designado de la entidad.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_user_id == user_id
    }
}

/// Datos de alta de una entidad. El estado inicial lo decide el registro de
/// estados del tipo, no el llamador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    pub entity_type: EntityType,
    pub title: String,
    pub owner_user_id: UserId,
}

impl NewEntity {
    pub fn new(entity_type: EntityType, title: impl Into<String>, owner_user_id: UserId) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".to_string()));
        }
        Ok(Self { entity_type, title, owner_user_id })
    }
}
