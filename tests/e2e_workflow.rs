use media_core::notify::{InMemoryUserDirectory, NotificationStore};
use media_core::NotificationKind;
use mediaflow_rust::{Actor, EntityType, NewEntity, Role, WorkflowEngine, WorkflowError};
use uuid::Uuid;

// E2E sobre la fachada del workspace: ciclo completo de un episodio con
// rechazo, reenvío y emisión, verificando notificaciones en cada tramo.
#[test]
fn episode_full_lifecycle_with_revisions() {
    let editor = Actor::new(Uuid::new_v4(), Role::Editor);
    let producer = Actor::new(Uuid::new_v4(), Role::Producer);
    let manager = Actor::new(Uuid::new_v4(), Role::ProgramManager);
    let directory = InMemoryUserDirectory::new().with_user(producer.user_id, Role::Producer);
    let mut engine = WorkflowEngine::in_memory(directory);

    let (episode, created) = engine.create(NewEntity::new(EntityType::Episode, "Capítulo 7", editor.user_id).unwrap(),
                                           editor)
                                   .expect("create episode");
    assert_eq!(episode.current_state, "draft");
    assert_eq!(created.from_state, None);

    engine.execute(EntityType::Episode, episode.id, "rundown_review", editor, "primer corte")
          .expect("submit rundown");
    engine.execute(EntityType::Episode, episode.id, "revisions_needed", producer, "falta bloque musical")
          .expect("request revisions");

    // El editor dueño reenvía (owner-override también lo cubriría)
    engine.execute(EntityType::Episode, episode.id, "rundown_review", editor, "bloque agregado")
          .expect("resubmit");
    engine.execute(EntityType::Episode, episode.id, "approved", producer, "ok")
          .expect("approve rundown");
    let receipt = engine.execute(EntityType::Episode, episode.id, "aired", manager, "")
                        .expect("mark aired");
    assert_eq!(receipt.entity.current_state, "aired");

    // aired es final
    let err = engine.execute(EntityType::Episode, episode.id, "draft", manager, "")
                    .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    let history = engine.history(EntityType::Episode, episode.id).expect("history");
    let states: Vec<&str> = history.iter().map(|r| r.to_state.as_str()).collect();
    assert_eq!(states,
               vec!["draft", "rundown_review", "revisions_needed", "rundown_review", "approved", "aired"]);
    engine.verify_consistency(EntityType::Episode, episode.id).expect("consistencia");

    // El editor (submitter) acumula los avisos de resultado; el productor los
    // de trabajo pendiente
    let editor_inbox = engine.notifications().list_for(editor.user_id).unwrap();
    assert!(editor_inbox.iter().all(|n| n.kind == NotificationKind::StateChanged));
    assert_eq!(editor_inbox.len(), 3, "revisions + approved + aired: {editor_inbox:?}");
    let producer_inbox = engine.notifications().list_for(producer.user_id).unwrap();
    assert_eq!(producer_inbox.len(), 2, "submit + resubmit: {producer_inbox:?}");
    assert!(producer_inbox.iter().all(|n| n.kind == NotificationKind::ApprovalRequested));
}

// Lectura cruzada: mark_read del destinatario y unread_count coherente.
#[test]
fn submitter_can_mark_notifications_read() {
    let manager = Actor::new(Uuid::new_v4(), Role::ProgramManager);
    let producer = Actor::new(Uuid::new_v4(), Role::Producer);
    let directory = InMemoryUserDirectory::new().with_user(producer.user_id, Role::Producer);
    let mut engine = WorkflowEngine::in_memory(directory);

    let (program, _) = engine.create(NewEntity::new(EntityType::Program, "P", manager.user_id).unwrap(), manager)
                             .unwrap();
    engine.execute(EntityType::Program, program.id, "pending_approval", manager, "")
          .unwrap();
    engine.execute(EntityType::Program, program.id, "rejected", producer, "sin presupuesto")
          .unwrap();

    let inbox = engine.notifications().list_for(manager.user_id).unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].message.contains("sin presupuesto"));
    let id = inbox[0].id;
    assert_eq!(engine.notifications().unread_count(manager.user_id).unwrap(), 1);
    assert!(engine.notifications_mut().mark_read(id, manager.user_id).unwrap());
    assert_eq!(engine.notifications().unread_count(manager.user_id).unwrap(), 0);
}
