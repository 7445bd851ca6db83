//! Store de workflow: entidad + historial append-only bajo un mismo contrato.

mod memory;
mod types;

pub use memory::InMemoryWorkflowStore;
pub use types::{HistoryRecord, StoreError, TransitionApplication};

use media_domain::{EntityType, UserId, WorkflowEntity};
use uuid::Uuid;

/// Recurso mutable compartido del motor: la fila de entidad y su ledger.
///
/// Contrato:
/// - `insert_entity` y `apply_transition` son los ÚNICOS escritores de
///   `current_state` y del historial; ambos son todo-o-nada.
/// - `apply_transition` hace compare-and-set sobre el from-state esperado:
///   es el punto de serialización que impide que dos requests concurrentes
///   pasen la validación contra una lectura vieja y bifurquen el historial.
/// - El historial nunca se actualiza ni borra; `history_for` devuelve un
///   snapshot consistente ordenado por `seq` ascendente.
pub trait WorkflowStore {
    /// Alta atómica: inserta la entidad y su registro de creación
    /// (`from_state = None`) en la misma unidad.
    fn insert_entity(&mut self, entity: WorkflowEntity, actor_user_id: UserId, notes: &str)
                     -> Result<HistoryRecord, StoreError>;

    /// Lectura de la entidad; `Ok(None)` si no existe.
    fn get_entity(&self, entity_type: EntityType, id: Uuid) -> Result<Option<WorkflowEntity>, StoreError>;

    /// Aplica una transición: CAS sobre `current_state` + append de historial.
    /// `StaleState` cuando el from-state esperado ya no es el vigente.
    fn apply_transition(&mut self, req: &TransitionApplication<'_>) -> Result<HistoryRecord, StoreError>;

    /// Historial de la entidad, ascendente por `seq`.
    fn history_for(&self, entity_type: EntityType, id: Uuid) -> Result<Vec<HistoryRecord>, StoreError>;

    /// `to_state` del registro más reciente; `Ok(None)` sin historial.
    /// Debe coincidir siempre con `current_state` de la entidad.
    fn latest_state(&self, entity_type: EntityType, id: Uuid) -> Result<Option<String>, StoreError>;
}
