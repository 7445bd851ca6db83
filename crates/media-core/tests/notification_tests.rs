use media_core::notify::{InMemoryNotificationStore, InMemoryUserDirectory, NotificationDispatcher,
                         NotificationStore, TransitionContext};
use media_core::{builtin_registry, NotificationKind, StoreError};
use media_core::store::HistoryRecord;
use media_domain::{Actor, EntityType, Role, WorkflowEntity};
use chrono::Utc;
use uuid::Uuid;

fn entity(owner: Uuid) -> WorkflowEntity {
    let now = Utc::now();
    WorkflowEntity { id: Uuid::new_v4(),
                     entity_type: EntityType::Program,
                     title: "Nocturno".to_string(),
                     owner_user_id: owner,
                     current_state: "pending_approval".to_string(),
                     created_at: now,
                     updated_at: now }
}

fn record_for(entity: &WorkflowEntity, from: &str, to: &str, actor: Uuid, notes: &str) -> HistoryRecord {
    HistoryRecord { seq: 7,
                    entity_type: entity.entity_type,
                    entity_id: entity.id,
                    from_state: Some(from.to_string()),
                    to_state: to.to_string(),
                    transition_id: Some("program.submit_for_approval".to_string()),
                    actor_user_id: actor,
                    notes: notes.to_string(),
                    ts: Utc::now() }
}

#[test]
fn role_rule_notifies_every_holder_except_the_actor() {
    let reg = builtin_registry();
    let rule = reg.transition(EntityType::Program, "draft", "pending_approval").unwrap();

    let actor = Actor::new(Uuid::new_v4(), Role::ProgramManager);
    let producer_a = Uuid::new_v4();
    let producer_b = Uuid::new_v4();
    let directory = InMemoryUserDirectory::new().with_user(producer_a, Role::Producer)
                                                .with_user(producer_b, Role::Producer)
                                                // el actor también con rol productor: debe excluirse
                                                .with_user(actor.user_id, Role::Producer);
    let entity = entity(actor.user_id);
    let record = record_for(&entity, "draft", "pending_approval", actor.user_id, "listo");

    let mut store = InMemoryNotificationStore::new();
    let ctx = TransitionContext { entity: &entity, rule, record: &record, actor };
    let created = NotificationDispatcher::new().dispatch(&mut store, &directory, &ctx);
    assert_eq!(created, 2);

    let inbox = store.list_for(producer_a).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::ApprovalRequested);
    assert!(inbox[0].message.contains("pending_approval"));
    assert!(store.list_for(actor.user_id).unwrap().is_empty(), "el actor no se auto-notifica");
}

#[test]
fn submitter_rule_notifies_the_owner() {
    let reg = builtin_registry();
    let rule = reg.transition(EntityType::Program, "pending_approval", "approved").unwrap();

    let owner = Uuid::new_v4();
    let producer = Actor::new(Uuid::new_v4(), Role::Producer);
    let entity = entity(owner);
    let record = record_for(&entity, "pending_approval", "approved", producer.user_id, "looks good");

    let mut store = InMemoryNotificationStore::new();
    let directory = InMemoryUserDirectory::new();
    let ctx = TransitionContext { entity: &entity, rule, record: &record, actor: producer };
    let created = NotificationDispatcher::new().dispatch(&mut store, &directory, &ctx);
    assert_eq!(created, 1);
    let inbox = store.list_for(owner).unwrap();
    assert_eq!(inbox[0].kind, NotificationKind::StateChanged);
    assert!(inbox[0].message.contains("looks good"));
}

#[test]
fn recipients_are_deduplicated() {
    // Dueño que además tiene el rol destinatario: una sola notificación
    let reg = builtin_registry();
    let rule = reg.transition(EntityType::Episode, "revisions_needed", "rundown_review").unwrap();

    let owner = Uuid::new_v4();
    let actor = Actor::new(Uuid::new_v4(), Role::Editor);
    let directory = InMemoryUserDirectory::new().with_user(owner, Role::Producer);
    let now = Utc::now();
    let entity = WorkflowEntity { id: Uuid::new_v4(),
                                  entity_type: EntityType::Episode,
                                  title: "Cap. 3".to_string(),
                                  owner_user_id: owner,
                                  current_state: "rundown_review".to_string(),
                                  created_at: now,
                                  updated_at: now };
    let record = HistoryRecord { seq: 1,
                                 entity_type: entity.entity_type,
                                 entity_id: entity.id,
                                 from_state: Some("revisions_needed".to_string()),
                                 to_state: "rundown_review".to_string(),
                                 transition_id: Some("episode.resubmit".to_string()),
                                 actor_user_id: actor.user_id,
                                 notes: String::new(),
                                 ts: now };
    let mut store = InMemoryNotificationStore::new();
    let ctx = TransitionContext { entity: &entity, rule, record: &record, actor };
    let created = NotificationDispatcher::new().dispatch(&mut store, &directory, &ctx);
    assert_eq!(created, 1);
    assert_eq!(store.list_for(owner).unwrap().len(), 1);
}

// Un store que falla baja el contador pero jamás propaga error: la transición
// autoritativa no se revierte por un problema de notificaciones.
#[test]
fn failing_store_is_swallowed_and_only_lowers_the_count() {
    struct FailingStore;
    impl NotificationStore for FailingStore {
        fn insert(&mut self, _new: media_core::notify::NewNotification)
                  -> Result<media_core::notify::Notification, StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
        fn list_for(&self, _user: Uuid) -> Result<Vec<media_core::notify::Notification>, StoreError> {
            Ok(vec![])
        }
        fn unread_count(&self, _user: Uuid) -> Result<usize, StoreError> {
            Ok(0)
        }
        fn mark_read(&mut self, _id: Uuid, _user: Uuid) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    let reg = builtin_registry();
    let rule = reg.transition(EntityType::Program, "pending_approval", "approved").unwrap();
    let owner = Uuid::new_v4();
    let producer = Actor::new(Uuid::new_v4(), Role::Producer);
    let entity = entity(owner);
    let record = record_for(&entity, "pending_approval", "approved", producer.user_id, "");

    let mut store = FailingStore;
    let directory = InMemoryUserDirectory::new();
    let ctx = TransitionContext { entity: &entity, rule, record: &record, actor: producer };
    let created = NotificationDispatcher::new().dispatch(&mut store, &directory, &ctx);
    assert_eq!(created, 0);
}

#[test]
fn mark_read_is_scoped_to_the_recipient() {
    let mut store = InMemoryNotificationStore::new();
    let recipient = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let n = store.insert(media_core::notify::NewNotification { recipient_user_id: recipient,
                                                               kind: NotificationKind::StateChanged,
                                                               title: "t".to_string(),
                                                               message: "m".to_string(),
                                                               entity_type: EntityType::Program,
                                                               entity_id: Uuid::new_v4() })
                 .unwrap();
    // Otro usuario no puede marcarla
    assert!(!store.mark_read(n.id, intruder).unwrap());
    assert_eq!(store.unread_count(recipient).unwrap(), 1);
    assert!(store.mark_read(n.id, recipient).unwrap());
    assert_eq!(store.unread_count(recipient).unwrap(), 0);
    let read = &store.list_for(recipient).unwrap()[0];
    assert!(read.is_read && read.read_at.is_some());
}
