//! media-core: motor de workflow/aprobación multi-rol
pub mod engine;
pub mod errors;
pub mod notify;
pub mod registry;
pub mod store;

pub use engine::{TransitionReceipt, WorkflowEngine};
pub use errors::WorkflowError;
pub use notify::{InMemoryNotificationStore, InMemoryUserDirectory, NotificationDispatcher, NotificationKind,
                 NotificationStore, UserDirectory};
pub use registry::{builtin_registry, RecipientRule, RegistryError, StateRegistry, TransitionRule, WorkflowState};
pub use store::{HistoryRecord, InMemoryWorkflowStore, StoreError, TransitionApplication, WorkflowStore};
