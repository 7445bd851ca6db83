//! Ejecutor de transiciones (orquestación de un cambio de estado).

pub mod core;

pub use core::{TransitionReceipt, WorkflowEngine};
