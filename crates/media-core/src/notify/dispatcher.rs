//! Dispatcher de notificaciones: resuelve destinatarios y crea registros.
//!
//! Best-effort respecto al cambio de estado autoritativo: `dispatch` nunca
//! devuelve error al llamador; los fallos del store se loguean y sólo bajan
//! el contador. No se garantiza idempotencia entre reintentos del llamador.

use log::warn;
use media_domain::{Actor, UserId, WorkflowEntity};

use super::store::NotificationStore;
use super::types::{NewNotification, NotificationKind};
use super::UserDirectory;
use crate::registry::{RecipientRule, TransitionRule};
use crate::store::HistoryRecord;

/// Contexto de una transición ya confirmada, insumo del dispatcher.
pub struct TransitionContext<'a> {
    pub entity: &'a WorkflowEntity,
    pub rule: &'a TransitionRule,
    pub record: &'a HistoryRecord,
    pub actor: Actor,
}

#[derive(Debug, Default)]
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Crea las notificaciones configuradas en la regla. Devuelve la cantidad
    /// efectivamente creada.
    pub fn dispatch<N, D>(&self, store: &mut N, directory: &D, ctx: &TransitionContext<'_>) -> usize
        where N: NotificationStore,
              D: UserDirectory
    {
        let mut created = 0usize;
        for (recipient, kind) in self.resolve_recipients(directory, ctx) {
            let new = NewNotification { recipient_user_id: recipient,
                                        kind,
                                        title: self.title_for(ctx),
                                        message: self.message_for(ctx),
                                        entity_type: ctx.entity.entity_type,
                                        entity_id: ctx.entity.id };
            match store.insert(new) {
                Ok(_) => created += 1,
                Err(e) => {
                    warn!("notification insert failed for user {recipient} ({} {}): {e}",
                          ctx.entity.entity_type,
                          ctx.entity.id);
                }
            }
        }
        created
    }

    /// Unión de las reglas de destinatarios, dedupeada y sin el actor (nadie
    /// se notifica de su propia acción).
    fn resolve_recipients<D: UserDirectory>(&self, directory: &D, ctx: &TransitionContext<'_>)
                                            -> Vec<(UserId, NotificationKind)> {
        let mut out: Vec<(UserId, NotificationKind)> = Vec::new();
        let mut push = |user: UserId, kind: NotificationKind, out: &mut Vec<(UserId, NotificationKind)>| {
            if user == ctx.actor.user_id {
                return;
            }
            if !out.iter().any(|(u, _)| *u == user) {
                out.push((user, kind));
            }
        };
        for rule in &ctx.rule.notify {
            match rule {
                RecipientRule::Role { role } => {
                    for user in directory.users_with_role(*role) {
                        push(user, NotificationKind::ApprovalRequested, &mut out);
                    }
                }
                RecipientRule::Submitter => {
                    push(ctx.entity.owner_user_id, NotificationKind::StateChanged, &mut out);
                }
                RecipientRule::Users { users } => {
                    for user in users {
                        push(*user, NotificationKind::StateChanged, &mut out);
                    }
                }
            }
        }
        out
    }

    fn title_for(&self, ctx: &TransitionContext<'_>) -> String {
        format!("{}: {}", ctx.entity.entity_type, ctx.entity.title)
    }

    fn message_for(&self, ctx: &TransitionContext<'_>) -> String {
        let from = ctx.record.from_state.as_deref().unwrap_or("-");
        if ctx.record.notes.is_empty() {
            format!("'{}' pasó de '{}' a '{}'", ctx.entity.title, from, ctx.record.to_state)
        } else {
            format!("'{}' pasó de '{}' a '{}': {}",
                    ctx.entity.title,
                    from,
                    ctx.record.to_state,
                    ctx.record.notes)
        }
    }
}
