//! Registros de notificación creados por el dispatcher.
//!
//! Mutables sólo por el destinatario al marcarlas leídas; el borrado queda en
//! manos de acción explícita del usuario o política de retención externa.

use chrono::{DateTime, Utc};
use media_domain::{EntityType, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clase de notificación (conjunto cerrado, estable en storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Hay trabajo pendiente para el destinatario (ej. algo entró a revisión).
    ApprovalRequested,
    /// Una entidad del destinatario cambió de estado (aprobada, rechazada...).
    StateChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ApprovalRequested => "approval_requested",
            NotificationKind::StateChanged => "state_changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Datos de inserción; `id`/`created_at` los asigna el store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
}
