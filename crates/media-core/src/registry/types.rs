//! Tipos del registro: estados, reglas de transición y su tabla autoritativa.
//!
//! Rol en el motor:
//! - El registro responde "¿existe transición de A a B para el tipo T, y la
//!   puede invocar el rol R?". Es la única tabla de permisos del sistema.
//! - Se siembra en el arranque (set builtin o carga desde storage) y después
//!   es de sólo lectura.
//! - La unicidad de la tripleta (tipo, from, to) se exige al escribir, de modo
//!   que el lookup nunca es ambiguo.

use media_domain::{Actor, EntityType, Role, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errores de configuración del registro (detectados al sembrar reglas).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown state '{state}' for {entity_type}")]
    UnknownState { entity_type: EntityType, state: String },
    #[error("duplicate state '{state}' for {entity_type}")]
    DuplicateState { entity_type: EntityType, state: String },
    #[error("duplicate transition {entity_type}: '{from}' -> '{to}'")]
    DuplicateTransition { entity_type: EntityType, from: String, to: String },
    #[error("state '{state}' is final and admits no outgoing transitions")]
    OutgoingFromFinal { entity_type: EntityType, state: String },
}

/// Definición de un estado dentro del grafo de un tipo de entidad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub name: String,
    pub label: String,
    pub order: u32,
    /// Un estado final no admite transiciones salientes.
    pub is_final: bool,
}

impl WorkflowState {
    pub fn new(name: impl Into<String>, label: impl Into<String>, order: u32, is_final: bool) -> Self {
        Self { name: name.into(),
               label: label.into(),
               order,
               is_final }
    }
}

/// Destinatarios de notificación configurados en una transición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecipientRule {
    /// Todos los usuarios que tengan el rol (resuelto vía UserDirectory).
    Role { role: Role },
    /// El dueño/creador original de la entidad.
    Submitter,
    /// Lista explícita de usuarios.
    Users { users: Vec<UserId> },
}

/// Arista del grafo: regla con nombre que liga `from_state` -> `to_state`,
/// con el conjunto de roles habilitados para invocarla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Identificador estable, ej. "program.submit_for_approval".
    pub id: String,
    pub entity_type: EntityType,
    pub from_state: String,
    pub to_state: String,
    pub allowed_roles: Vec<Role>,
    /// Si está activo, el dueño de la entidad puede invocar la transición
    /// aunque su rol no esté en el allow-list.
    pub owner_override: bool,
    pub notify: Vec<RecipientRule>,
}

impl TransitionRule {
    /// Chequeo de rol: pertenencia exacta al allow-list configurado.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    /// Guard completo: rol permitido, o dueño cuando la regla lo habilita.
    pub fn authorizes(&self, actor: Actor, owner_user_id: UserId) -> bool {
        self.permits(actor.role) || (self.owner_override && actor.user_id == owner_user_id)
    }
}

/// Tabla autoritativa de estados y transiciones por tipo de entidad.
pub struct StateRegistry {
    states: HashMap<EntityType, Vec<WorkflowState>>,
    transitions: Vec<TransitionRule>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self { states: HashMap::new(),
               transitions: Vec::new() }
    }

    /// Registra un estado. Los estados de cada tipo quedan ordenados por
    /// `order` (el menor es el estado inicial de alta).
    pub fn add_state(&mut self, entity_type: EntityType, state: WorkflowState) -> Result<(), RegistryError> {
        let states = self.states.entry(entity_type).or_default();
        if states.iter().any(|s| s.name == state.name) {
            return Err(RegistryError::DuplicateState { entity_type, state: state.name });
        }
        states.push(state);
        states.sort_by_key(|s| s.order);
        Ok(())
    }

    /// Registra una regla de transición validando endpoints, unicidad de la
    /// tripleta y que el origen no sea final.
    pub fn add_transition(&mut self, rule: TransitionRule) -> Result<(), RegistryError> {
        let from = self.state(rule.entity_type, &rule.from_state)
                       .ok_or_else(|| RegistryError::UnknownState { entity_type: rule.entity_type,
                                                                    state: rule.from_state.clone() })?;
        if from.is_final {
            return Err(RegistryError::OutgoingFromFinal { entity_type: rule.entity_type,
                                                          state: rule.from_state.clone() });
        }
        if self.state(rule.entity_type, &rule.to_state).is_none() {
            return Err(RegistryError::UnknownState { entity_type: rule.entity_type,
                                                     state: rule.to_state.clone() });
        }
        if self.transition(rule.entity_type, &rule.from_state, &rule.to_state).is_some() {
            return Err(RegistryError::DuplicateTransition { entity_type: rule.entity_type,
                                                            from: rule.from_state.clone(),
                                                            to: rule.to_state.clone() });
        }
        self.transitions.push(rule);
        Ok(())
    }

    /// Lista ordenada de estados del tipo. Vacía si el tipo no tiene grafo
    /// registrado; nunca falla (validar el tipo es responsabilidad previa del
    /// llamador).
    pub fn states_for(&self, entity_type: EntityType) -> &[WorkflowState] {
        self.states.get(&entity_type).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Busca un estado por nombre exacto.
    pub fn state(&self, entity_type: EntityType, name: &str) -> Option<&WorkflowState> {
        self.states_for(entity_type).iter().find(|s| s.name == name)
    }

    /// Estado inicial del tipo (menor `order`).
    pub fn initial_state(&self, entity_type: EntityType) -> Option<&WorkflowState> {
        self.states_for(entity_type).first()
    }

    /// Lookup exacto sobre la tripleta (tipo, from, to). Primera por orden de
    /// alta; la unicidad exigida en `add_transition` hace el orden irrelevante.
    pub fn transition(&self, entity_type: EntityType, from: &str, to: &str) -> Option<&TransitionRule> {
        self.transitions
            .iter()
            .find(|t| t.entity_type == entity_type && t.from_state == from && t.to_state == to)
    }

    /// Todas las reglas salientes de un estado.
    pub fn transitions_from(&self, entity_type: EntityType, from: &str) -> Vec<&TransitionRule> {
        self.transitions
            .iter()
            .filter(|t| t.entity_type == entity_type && t.from_state == from)
            .collect()
    }

    /// Reglas completas del registro (para volcados/sembrado en storage).
    pub fn transitions(&self) -> &[TransitionRule] {
        &self.transitions
    }

    /// Destinos que el actor puede alcanzar desde `from`, considerando rol y
    /// owner-override. Es el contexto de diagnóstico de `InvalidTransition`:
    /// no revela reglas de otros roles.
    pub fn allowed_targets(&self, entity_type: EntityType, from: &str, actor: Actor, owner_user_id: UserId) -> Vec<String> {
        self.transitions_from(entity_type, from)
            .into_iter()
            .filter(|t| t.authorizes(actor, owner_user_id))
            .map(|t| t.to_state.clone())
            .collect()
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
