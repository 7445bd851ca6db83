use chrono::Utc;
use media_domain::UserId;
use uuid::Uuid;

use super::types::{NewNotification, Notification};
use crate::store::StoreError;

/// Persistencia de notificaciones. La entrega real (push/email) es un
/// colaborador externo que consume estos registros.
pub trait NotificationStore {
    fn insert(&mut self, new: NewNotification) -> Result<Notification, StoreError>;
    /// Notificaciones del usuario, más recientes primero.
    fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError>;
    fn unread_count(&self, user_id: UserId) -> Result<usize, StoreError>;
    /// Marca leída una notificación del usuario; `Ok(false)` si no existe o
    /// no le pertenece.
    fn mark_read(&mut self, id: Uuid, user_id: UserId) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    inner: Vec<Notification>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn insert(&mut self, new: NewNotification) -> Result<Notification, StoreError> {
        let n = Notification { id: Uuid::new_v4(),
                               recipient_user_id: new.recipient_user_id,
                               kind: new.kind,
                               title: new.title,
                               message: new.message,
                               entity_type: new.entity_type,
                               entity_id: new.entity_id,
                               is_read: false,
                               read_at: None,
                               created_at: Utc::now() };
        self.inner.push(n.clone());
        Ok(n)
    }

    fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError> {
        let mut out: Vec<Notification> = self.inner
                                             .iter()
                                             .filter(|n| n.recipient_user_id == user_id)
                                             .cloned()
                                             .collect();
        out.reverse();
        Ok(out)
    }

    fn unread_count(&self, user_id: UserId) -> Result<usize, StoreError> {
        Ok(self.inner
               .iter()
               .filter(|n| n.recipient_user_id == user_id && !n.is_read)
               .count())
    }

    fn mark_read(&mut self, id: Uuid, user_id: UserId) -> Result<bool, StoreError> {
        match self.inner
                  .iter_mut()
                  .find(|n| n.id == id && n.recipient_user_id == user_id)
        {
            Some(n) => {
                if !n.is_read {
                    n.is_read = true;
                    n.read_at = Some(Utc::now());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
