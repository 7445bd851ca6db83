//! Grafos sembrados de producción para los tres tipos de entidad.
//!
//! Los rechazos vuelven a un estado anterior (los grafos no son acíclicos por
//! diseño); los estados finales (`is_final`) no tienen salidas. El sembrado
//! SQL de media-persistence refleja exactamente este set.

use media_domain::{EntityType, Role};

use super::types::{RecipientRule, StateRegistry, TransitionRule, WorkflowState};

fn rule(id: &str,
        entity_type: EntityType,
        from: &str,
        to: &str,
        roles: &[Role],
        owner_override: bool,
        notify: Vec<RecipientRule>)
        -> TransitionRule {
    TransitionRule { id: id.to_string(),
                     entity_type,
                     from_state: from.to_string(),
                     to_state: to.to_string(),
                     allowed_roles: roles.to_vec(),
                     owner_override,
                     notify }
}

/// Construye el registro con el set de reglas de producción.
///
/// El sembrado es código confiable: cualquier `RegistryError` aquí es un bug
/// de programación, por eso el `expect`.
pub fn builtin_registry() -> StateRegistry {
    let mut reg = StateRegistry::new();

    // ---- Programas ----
    for (name, label, order, is_final) in [("draft", "Borrador", 0, false),
                                           ("pending_approval", "Pendiente de aprobación", 1, false),
                                           ("rejected", "Rechazado", 2, false),
                                           ("approved", "Aprobado", 3, false),
                                           ("scheduled", "Agendado", 4, false),
                                           ("in_production", "En producción", 5, false),
                                           ("archived", "Archivado", 6, true)]
    {
        reg.add_state(EntityType::Program, WorkflowState::new(name, label, order, is_final))
           .expect("builtin program states");
    }
    for r in [rule("program.submit_for_approval",
                   EntityType::Program,
                   "draft",
                   "pending_approval",
                   &[Role::ProgramManager],
                   true,
                   vec![RecipientRule::Role { role: Role::Producer }]),
              rule("program.approve",
                   EntityType::Program,
                   "pending_approval",
                   "approved",
                   &[Role::Producer],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("program.reject",
                   EntityType::Program,
                   "pending_approval",
                   "rejected",
                   &[Role::Producer],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("program.revise",
                   EntityType::Program,
                   "rejected",
                   "draft",
                   &[Role::ProgramManager],
                   true,
                   vec![]),
              rule("program.schedule",
                   EntityType::Program,
                   "approved",
                   "scheduled",
                   &[Role::ProgramManager],
                   false,
                   vec![RecipientRule::Role { role: Role::Producer }]),
              rule("program.start_production",
                   EntityType::Program,
                   "scheduled",
                   "in_production",
                   &[Role::ProgramManager, Role::Producer],
                   false,
                   vec![]),
              rule("program.archive",
                   EntityType::Program,
                   "in_production",
                   "archived",
                   &[Role::Admin],
                   false,
                   vec![RecipientRule::Submitter])]
    {
        reg.add_transition(r).expect("builtin program transitions");
    }

    // ---- Episodios ----
    for (name, label, order, is_final) in [("draft", "Borrador", 0, false),
                                           ("rundown_review", "Rundown en revisión", 1, false),
                                           ("revisions_needed", "Requiere cambios", 2, false),
                                           ("approved", "Aprobado", 3, false),
                                           ("aired", "Emitido", 4, true)]
    {
        reg.add_state(EntityType::Episode, WorkflowState::new(name, label, order, is_final))
           .expect("builtin episode states");
    }
    for r in [rule("episode.submit_rundown",
                   EntityType::Episode,
                   "draft",
                   "rundown_review",
                   &[Role::Editor],
                   true,
                   vec![RecipientRule::Role { role: Role::Producer }]),
              rule("episode.approve_rundown",
                   EntityType::Episode,
                   "rundown_review",
                   "approved",
                   &[Role::Producer],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("episode.request_revisions",
                   EntityType::Episode,
                   "rundown_review",
                   "revisions_needed",
                   &[Role::Producer],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("episode.resubmit",
                   EntityType::Episode,
                   "revisions_needed",
                   "rundown_review",
                   &[Role::Editor],
                   true,
                   vec![RecipientRule::Role { role: Role::Producer }]),
              rule("episode.mark_aired",
                   EntityType::Episode,
                   "approved",
                   "aired",
                   &[Role::ProgramManager],
                   false,
                   vec![RecipientRule::Submitter])]
    {
        reg.add_transition(r).expect("builtin episode transitions");
    }

    // ---- Envíos musicales ----
    for (name, label, order, is_final) in [("submitted", "Enviado", 0, false),
                                           ("screening", "En escucha", 1, false),
                                           ("rejected", "Rechazado", 2, false),
                                           ("approved", "Aprobado", 3, false),
                                           ("published", "Publicado", 4, true)]
    {
        reg.add_state(EntityType::MusicSubmission, WorkflowState::new(name, label, order, is_final))
           .expect("builtin music states");
    }
    for r in [rule("music.begin_screening",
                   EntityType::MusicSubmission,
                   "submitted",
                   "screening",
                   &[Role::MusicCurator],
                   false,
                   vec![]),
              rule("music.approve",
                   EntityType::MusicSubmission,
                   "screening",
                   "approved",
                   &[Role::MusicCurator],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("music.reject",
                   EntityType::MusicSubmission,
                   "screening",
                   "rejected",
                   &[Role::MusicCurator],
                   false,
                   vec![RecipientRule::Submitter]),
              rule("music.resubmit",
                   EntityType::MusicSubmission,
                   "rejected",
                   "submitted",
                   &[],
                   true,
                   vec![RecipientRule::Role { role: Role::MusicCurator }]),
              rule("music.publish",
                   EntityType::MusicSubmission,
                   "approved",
                   "published",
                   &[Role::Admin, Role::MusicCurator],
                   false,
                   vec![RecipientRule::Submitter])]
    {
        reg.add_transition(r).expect("builtin music transitions");
    }

    reg
}
