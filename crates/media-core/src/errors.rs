//! Errores del núcleo, orientados al llamador externo.
//!
//! Taxonomía:
//! - `EntityNotFound` / `UnknownState`: nombre inexistente; error de cliente,
//!   sin reintento.
//! - `InvalidTransition`: no hay regla desde el estado actual (incluye
//!   intentos de salir de un estado final). Lleva el estado actual y los
//!   destinos permitidos PARA EL ACTOR, para diagnóstico sin filtrar reglas
//!   de otros roles.
//! - `Forbidden`: el rol/propiedad del actor no autoriza la transición.
//! - `Consistency`: `current_state` no coincide con el historial. Interno y
//!   fatal para la operación; indica bug previo de concurrencia o storage.
//! - `Internal`: fallo de storage u otro imprevisto.

use media_domain::{EntityType, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Clone, Serialize, Deserialize)]
pub enum WorkflowError {
    #[error("{entity_type} {entity_id} not found")]
    EntityNotFound { entity_type: EntityType, entity_id: Uuid },
    #[error("unknown state '{state}' for {entity_type}")]
    UnknownState { entity_type: EntityType, state: String },
    #[error("no transition from '{current}' to '{requested}' for {entity_type}")]
    InvalidTransition {
        entity_type: EntityType,
        current: String,
        requested: String,
        /// Destinos alcanzables por el actor desde `current` (puede ser vacío).
        allowed: Vec<String>,
    },
    #[error("role '{role}' may not move {entity_type} from '{from}' to '{to}'")]
    Forbidden {
        entity_type: EntityType,
        role: Role,
        from: String,
        to: String,
    },
    #[error("state/history mismatch for {entity_type} {entity_id}: entity='{entity_state}' history='{history_state}'")]
    Consistency {
        entity_type: EntityType,
        entity_id: Uuid,
        entity_state: String,
        history_state: String,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// `true` para errores atribuibles al cliente (se mapean a 4xx fuera del
    /// núcleo); `false` para internos.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, WorkflowError::Consistency { .. } | WorkflowError::Internal(_))
    }
}
