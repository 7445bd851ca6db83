use std::collections::HashMap;

use chrono::Utc;
use media_domain::{EntityType, UserId, WorkflowEntity};
use uuid::Uuid;

use super::types::{HistoryRecord, StoreError, TransitionApplication};
use super::WorkflowStore;

/// Backend en memoria. La exclusividad de `&mut self` más el re-chequeo del
/// from-state reproducen la semántica de fallo del backend Postgres
/// (`FOR UPDATE` + CAS), de modo que los tests cubren ambos por igual.
pub struct InMemoryWorkflowStore {
    entities: HashMap<(EntityType, Uuid), WorkflowEntity>,
    history: Vec<HistoryRecord>,
    next_seq: u64,
}

impl Default for InMemoryWorkflowStore {
    fn default() -> Self {
        Self { entities: HashMap::new(),
               history: Vec::new(),
               next_seq: 1 }
    }
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_record(&mut self, record: HistoryRecord) -> HistoryRecord {
        self.history.push(record.clone());
        record
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn insert_entity(&mut self, entity: WorkflowEntity, actor_user_id: UserId, notes: &str)
                     -> Result<HistoryRecord, StoreError> {
        let key = (entity.entity_type, entity.id);
        if self.entities.contains_key(&key) {
            return Err(StoreError::DuplicateEntity);
        }
        let seq = self.take_seq();
        let record = HistoryRecord { seq,
                                     entity_type: entity.entity_type,
                                     entity_id: entity.id,
                                     from_state: None,
                                     to_state: entity.current_state.clone(),
                                     transition_id: None,
                                     actor_user_id,
                                     notes: notes.to_string(),
                                     ts: Utc::now() };
        self.entities.insert(key, entity);
        Ok(self.push_record(record))
    }

    fn get_entity(&self, entity_type: EntityType, id: Uuid) -> Result<Option<WorkflowEntity>, StoreError> {
        Ok(self.entities.get(&(entity_type, id)).cloned())
    }

    fn apply_transition(&mut self, req: &TransitionApplication<'_>) -> Result<HistoryRecord, StoreError> {
        let seq = self.take_seq();
        let entity = self.entities
                         .get_mut(&(req.entity_type, req.entity_id))
                         .ok_or(StoreError::EntityNotFound)?;
        // CAS: el estado vigente debe seguir siendo el observado al validar.
        if entity.current_state != req.expected_from {
            return Err(StoreError::StaleState { expected: req.expected_from.to_string(),
                                                found: entity.current_state.clone() });
        }
        let now = Utc::now();
        entity.current_state = req.to_state.to_string();
        entity.updated_at = now;
        let record = HistoryRecord { seq,
                                     entity_type: req.entity_type,
                                     entity_id: req.entity_id,
                                     from_state: Some(req.expected_from.to_string()),
                                     to_state: req.to_state.to_string(),
                                     transition_id: Some(req.transition_id.to_string()),
                                     actor_user_id: req.actor_user_id,
                                     notes: req.notes.to_string(),
                                     ts: now };
        Ok(self.push_record(record))
    }

    fn history_for(&self, entity_type: EntityType, id: Uuid) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self.history
               .iter()
               .filter(|r| r.entity_type == entity_type && r.entity_id == id)
               .cloned()
               .collect())
    }

    fn latest_state(&self, entity_type: EntityType, id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(self.history
               .iter()
               .rev()
               .find(|r| r.entity_type == entity_type && r.entity_id == id)
               .map(|r| r.to_state.clone()))
    }
}
