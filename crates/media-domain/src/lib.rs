// media-domain library entry point
pub mod actor;
pub mod entity;
pub mod error;
pub use actor::{Actor, Role, UserId};
pub use entity::{EntityType, NewEntity, WorkflowEntity};
pub use error::DomainError;
