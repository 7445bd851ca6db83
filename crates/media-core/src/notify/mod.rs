//! Notificaciones: registros, store y dispatcher best-effort.

mod dispatcher;
mod store;
mod types;

pub use dispatcher::{NotificationDispatcher, TransitionContext};
pub use store::{InMemoryNotificationStore, NotificationStore};
pub use types::{NewNotification, Notification, NotificationKind};

use media_domain::{Role, UserId};
use std::collections::HashMap;

/// Directorio de usuarios consumido por el dispatcher para resolver
/// destinatarios por rol. La gestión de cuentas es externa al núcleo.
pub trait UserDirectory {
    /// Usuarios que tienen el rol. Mejor-esfuerzo: una implementación con
    /// backend remoto puede devolver vacío ante un fallo (y loguearlo).
    fn users_with_role(&self, role: Role) -> Vec<UserId>;
}

/// Directorio en memoria para demos y tests.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    by_role: HashMap<Role, Vec<UserId>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user_id: UserId, role: Role) {
        self.by_role.entry(role).or_default().push(user_id);
    }

    pub fn with_user(mut self, user_id: UserId, role: Role) -> Self {
        self.add_user(user_id, role);
        self
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn users_with_role(&self, role: Role) -> Vec<UserId> {
        self.by_role.get(&role).cloned().unwrap_or_default()
    }
}
