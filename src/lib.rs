//! MediaFlow Rust Library
//!
//! Este crate actúa como fachada del workspace:
//! - Re-exporta el dominio (tipos de entidad, roles, actor).
//! - Re-exporta el motor de workflow (registro, ejecutor, historial,
//!   notificaciones) y sus errores.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes; la capa
//! persistente vive en `media-persistence`.

pub use media_core::{builtin_registry, StateRegistry, TransitionReceipt, WorkflowEngine, WorkflowError};
pub use media_domain::{Actor, EntityType, NewEntity, Role, WorkflowEntity};
