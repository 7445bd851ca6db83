//! Core WorkflowEngine implementation
//!
//! Orquesta una petición de cambio de estado: carga la entidad, valida
//! precondiciones contra el registro, aplica el cambio de forma atómica en el
//! store y despacha notificaciones best-effort. Toda mutación de
//! `current_state` e historial pasa por acá; ningún otro componente escribe.

use chrono::Utc;
use log::{debug, error, warn};
use uuid::Uuid;

use media_domain::{Actor, EntityType, NewEntity, UserId, WorkflowEntity};

use crate::errors::WorkflowError;
use crate::notify::{InMemoryNotificationStore, InMemoryUserDirectory, NotificationDispatcher, NotificationStore,
                    TransitionContext, UserDirectory};
use crate::registry::{builtin_registry, StateRegistry};
use crate::store::{HistoryRecord, InMemoryWorkflowStore, StoreError, TransitionApplication, WorkflowStore};

/// Resultado de una transición confirmada.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReceipt {
    /// Entidad ya actualizada (nuevo `current_state`).
    pub entity: WorkflowEntity,
    /// Registro de historial creado por la transición.
    pub record: HistoryRecord,
    /// Notificaciones efectivamente creadas (best-effort).
    pub notifications: usize,
}

/// Motor de transiciones con handles explícitos de storage.
///
/// Genérico sobre el store de workflow, el de notificaciones y el directorio
/// de usuarios; no hay singletons ambientales.
pub struct WorkflowEngine<S, N, D>
    where S: WorkflowStore,
          N: NotificationStore,
          D: UserDirectory
{
    registry: StateRegistry,
    store: S,
    notifications: N,
    directory: D,
    dispatcher: NotificationDispatcher,
}

impl WorkflowEngine<InMemoryWorkflowStore, InMemoryNotificationStore, InMemoryUserDirectory> {
    /// Motor en memoria con el set de reglas builtin (demos y tests).
    pub fn in_memory(directory: InMemoryUserDirectory) -> Self {
        Self::new(builtin_registry(),
                  InMemoryWorkflowStore::new(),
                  InMemoryNotificationStore::new(),
                  directory)
    }
}

impl<S, N, D> WorkflowEngine<S, N, D>
    where S: WorkflowStore,
          N: NotificationStore,
          D: UserDirectory
{
    /// Crea un motor con los stores proporcionados.
    pub fn new(registry: StateRegistry, store: S, notifications: N, directory: D) -> Self {
        Self { registry,
               store,
               notifications,
               directory,
               dispatcher: NotificationDispatcher::new() }
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifications(&self) -> &N {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut N {
        &mut self.notifications
    }

    /// Alta de una entidad en el estado inicial de su tipo, con registro de
    /// creación (`from_state = None`) en la misma unidad atómica.
    pub fn create(&mut self, new: NewEntity, actor: Actor) -> Result<(WorkflowEntity, HistoryRecord), WorkflowError> {
        let initial = self.registry
                          .initial_state(new.entity_type)
                          .ok_or_else(|| WorkflowError::Internal(format!("no states registered for {}",
                                                                         new.entity_type)))?
                          .name
                          .clone();
        let now = Utc::now();
        let entity = WorkflowEntity { id: Uuid::new_v4(),
                                      entity_type: new.entity_type,
                                      title: new.title,
                                      owner_user_id: new.owner_user_id,
                                      current_state: initial,
                                      created_at: now,
                                      updated_at: now };
        let record = self.store
                         .insert_entity(entity.clone(), actor.user_id, "")
                         .map_err(|e| WorkflowError::Internal(e.to_string()))?;
        debug!("created {} {} in '{}'", entity.entity_type, entity.id, entity.current_state);
        Ok((entity, record))
    }

    /// Ejecuta una transición. Precondiciones en orden:
    /// 1. la entidad existe;
    /// 2. el estado pedido es un nombre válido del tipo;
    /// 3. entidad e historial están de acuerdo (chequeo de deriva);
    /// 4. hay regla desde el estado vigente al pedido;
    /// 5. el rol del actor está permitido, o aplica owner-override.
    ///
    /// Efecto: CAS + append de historial, todo-o-nada en el store; después
    /// del commit se despachan notificaciones sin afectar el resultado.
    pub fn execute(&mut self,
                   entity_type: EntityType,
                   entity_id: Uuid,
                   to_state: &str,
                   actor: Actor,
                   notes: &str)
                   -> Result<TransitionReceipt, WorkflowError> {
        let entity = self.load_entity(entity_type, entity_id)?;

        if self.registry.state(entity_type, to_state).is_none() {
            return Err(WorkflowError::UnknownState { entity_type, state: to_state.to_string() });
        }

        self.check_consistency(&entity)?;

        let rule = match self.registry.transition(entity_type, &entity.current_state, to_state) {
            Some(rule) => rule.clone(),
            None => return Err(self.invalid_transition(&entity, to_state, actor)),
        };

        if !rule.authorizes(actor, entity.owner_user_id) {
            return Err(WorkflowError::Forbidden { entity_type,
                                                  role: actor.role,
                                                  from: entity.current_state.clone(),
                                                  to: to_state.to_string() });
        }

        let from_state = entity.current_state.clone();
        let application = TransitionApplication { entity_type,
                                                  entity_id,
                                                  expected_from: &from_state,
                                                  to_state,
                                                  transition_id: &rule.id,
                                                  actor_user_id: actor.user_id,
                                                  notes };
        let record = match self.store.apply_transition(&application) {
            Ok(record) => record,
            // Perdimos la carrera: reportar contra una lectura fresca.
            Err(StoreError::StaleState { .. }) => {
                let fresh = self.load_entity(entity_type, entity_id)?;
                return Err(self.invalid_transition(&fresh, to_state, actor));
            }
            Err(StoreError::EntityNotFound) => {
                return Err(WorkflowError::EntityNotFound { entity_type, entity_id });
            }
            Err(e) => return Err(WorkflowError::Internal(e.to_string())),
        };

        let updated = WorkflowEntity { current_state: record.to_state.clone(),
                                       updated_at: record.ts,
                                       ..entity };
        let ctx = TransitionContext { entity: &updated,
                                      rule: &rule,
                                      record: &record,
                                      actor };
        let notifications = self.dispatcher.dispatch(&mut self.notifications, &self.directory, &ctx);
        debug!("transition {} applied on {} {} ({} -> {}), {} notifications",
               rule.id,
               entity_type,
               entity_id,
               from_state,
               record.to_state,
               notifications);

        Ok(TransitionReceipt { entity: updated,
                               record,
                               notifications })
    }

    /// Historial completo de la entidad, ascendente por `seq`.
    pub fn history(&self, entity_type: EntityType, entity_id: Uuid) -> Result<Vec<HistoryRecord>, WorkflowError> {
        // Existencia primero: historial de una entidad inexistente es NotFound
        let _ = self.load_entity(entity_type, entity_id)?;
        self.store
            .history_for(entity_type, entity_id)
            .map_err(|e| WorkflowError::Internal(e.to_string()))
    }

    /// Destinos alcanzables por el actor desde el estado vigente.
    pub fn allowed(&self, entity_type: EntityType, entity_id: Uuid, actor: Actor) -> Result<Vec<String>, WorkflowError> {
        let entity = self.load_entity(entity_type, entity_id)?;
        Ok(self.registry
               .allowed_targets(entity_type, &entity.current_state, actor, entity.owner_user_id))
    }

    /// Chequeo explícito del invariante entidad/historial (para tests y
    /// alertas operativas). Nunca repara; sólo reporta.
    pub fn verify_consistency(&self, entity_type: EntityType, entity_id: Uuid) -> Result<(), WorkflowError> {
        let entity = self.load_entity(entity_type, entity_id)?;
        self.check_consistency(&entity)
    }

    fn load_entity(&self, entity_type: EntityType, entity_id: Uuid) -> Result<WorkflowEntity, WorkflowError> {
        match self.store.get_entity(entity_type, entity_id) {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(WorkflowError::EntityNotFound { entity_type, entity_id }),
            Err(e) => Err(WorkflowError::Internal(e.to_string())),
        }
    }

    fn check_consistency(&self, entity: &WorkflowEntity) -> Result<(), WorkflowError> {
        let latest = self.store
                         .latest_state(entity.entity_type, entity.id)
                         .map_err(|e| WorkflowError::Internal(e.to_string()))?;
        match latest {
            Some(history_state) if history_state != entity.current_state => {
                // Deriva entidad/historial: bug previo de concurrencia o
                // storage. Se loguea fuerte y se aborta la operación.
                error!("consistency violation on {} {}: entity='{}' history='{}'",
                       entity.entity_type,
                       entity.id,
                       entity.current_state,
                       history_state);
                Err(WorkflowError::Consistency { entity_type: entity.entity_type,
                                                 entity_id: entity.id,
                                                 entity_state: entity.current_state.clone(),
                                                 history_state })
            }
            Some(_) => Ok(()),
            None => {
                // Entidad sin historial: tolerado para filas importadas por
                // fuera del motor, pero queda avisado.
                warn!("{} {} has no history records", entity.entity_type, entity.id);
                Ok(())
            }
        }
    }

    fn invalid_transition(&self, entity: &WorkflowEntity, requested: &str, actor: Actor) -> WorkflowError {
        WorkflowError::InvalidTransition { entity_type: entity.entity_type,
                                           current: entity.current_state.clone(),
                                           requested: requested.to_string(),
                                           allowed: self.registry.allowed_targets(entity.entity_type,
                                                                                  &entity.current_state,
                                                                                  actor,
                                                                                  entity.owner_user_id) }
    }
}
