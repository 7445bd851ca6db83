//! Tipos del store: registro de historial y petición de aplicación.
//!
//! `HistoryRecord` es el contrato observable del ledger: cada transición (y
//! cada alta) deja exactamente un registro, inmutable desde su inserción.

use chrono::{DateTime, Utc};
use media_domain::{EntityType, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Registro inmutable del ledger de transiciones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Asignado por el store en orden de append (BIGSERIAL en Postgres,
    /// contador en memoria). Global al ledger, ascendente.
    pub seq: u64,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// `None` sólo en el registro de creación de la entidad.
    pub from_state: Option<String>,
    pub to_state: String,
    /// Id de la regla invocada; `None` en el registro de creación.
    pub transition_id: Option<String>,
    pub actor_user_id: UserId,
    pub notes: String,
    /// Metadato asignado por el store; no participa en la validación.
    pub ts: DateTime<Utc>,
}

/// Petición de aplicación de una transición ya validada por el ejecutor.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionApplication<'a> {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// Estado vigente observado en la validación; el store lo re-chequea
    /// dentro de su unidad atómica (CAS).
    pub expected_from: &'a str,
    pub to_state: &'a str,
    pub transition_id: &'a str,
    pub actor_user_id: UserId,
    pub notes: &'a str,
}

/// Errores de la capa de store (backend-agnósticos).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StoreError {
    #[error("entity not found")]
    EntityNotFound,
    #[error("duplicate entity id")]
    DuplicateEntity,
    /// El from-state esperado ya no es el vigente: otra transición ganó la
    /// carrera. El ejecutor lo reporta contra una lectura fresca.
    #[error("stale state: expected '{expected}', found '{found}'")]
    StaleState { expected: String, found: String },
    #[error("storage failure: {0}")]
    Backend(String),
}
