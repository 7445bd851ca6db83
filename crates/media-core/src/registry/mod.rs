//! Registro de estados y transiciones por tipo de entidad.

mod builtin;
mod types;

pub use builtin::builtin_registry;
pub use types::{RecipientRule, RegistryError, StateRegistry, TransitionRule, WorkflowState};
