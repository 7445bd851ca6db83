mod test_support;
use test_support::with_pool;

use chrono::Utc;
use media_core::store::{StoreError, TransitionApplication, WorkflowStore};
use media_persistence::pg::{PgWorkflowStore, PoolProvider};
use media_domain::{EntityType, WorkflowEntity};
use uuid::Uuid;

fn fresh_program(owner: Uuid) -> WorkflowEntity {
    let now = Utc::now();
    WorkflowEntity { id: Uuid::new_v4(),
                     entity_type: EntityType::Program,
                     title: "Programa DB".to_string(),
                     owner_user_id: owner,
                     current_state: "draft".to_string(),
                     created_at: now,
                     updated_at: now }
}

// Alta + transición: paridad con el backend en memoria (historial ascendente,
// latest_state == current_state, CAS viejo pierde sin tocar el ledger).
#[test]
fn insert_apply_and_read_back() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip insert_apply_and_read_back (no DATABASE_URL)");
        return;
    }
    with_pool(|pool| {
        let mut store = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
        let owner = Uuid::new_v4();
        let entity = fresh_program(owner);
        let entity_id = entity.id;

        let created = store.insert_entity(entity, owner, "").expect("insert entity");
        assert_eq!(created.from_state, None);
        assert_eq!(created.to_state, "draft");

        // Releer: la fila existe con el estado inicial
        let read = store.get_entity(EntityType::Program, entity_id)
                        .expect("get")
                        .expect("entity must exist");
        assert_eq!(read.current_state, "draft");

        let applied = store.apply_transition(&TransitionApplication { entity_type: EntityType::Program,
                                                                      entity_id,
                                                                      expected_from: "draft",
                                                                      to_state: "pending_approval",
                                                                      transition_id: "program.submit_for_approval",
                                                                      actor_user_id: owner,
                                                                      notes: "a revisión" })
                           .expect("apply");
        assert!(applied.seq > created.seq, "seq debe crecer");

        let history = store.history_for(EntityType::Program, entity_id).expect("history");
        assert_eq!(history.len(), 2);
        assert!(history[0].seq < history[1].seq);
        assert_eq!(history[1].from_state.as_deref(), Some("draft"));
        assert_eq!(store.latest_state(EntityType::Program, entity_id).unwrap().as_deref(),
                   Some("pending_approval"));
        let read = store.get_entity(EntityType::Program, entity_id).unwrap().unwrap();
        assert_eq!(read.current_state, "pending_approval");

        // CAS viejo: pierde y el ledger queda igual
        let stale = store.apply_transition(&TransitionApplication { entity_type: EntityType::Program,
                                                                    entity_id,
                                                                    expected_from: "draft",
                                                                    to_state: "pending_approval",
                                                                    transition_id: "program.submit_for_approval",
                                                                    actor_user_id: owner,
                                                                    notes: "" })
                         .unwrap_err();
        assert!(matches!(stale, StoreError::StaleState { .. }), "got {stale:?}");
        assert_eq!(store.history_for(EntityType::Program, entity_id).unwrap().len(), 2);

        std::mem::forget(store);
    });
}

#[test]
fn missing_entity_is_entity_not_found() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip missing_entity_is_entity_not_found (no DATABASE_URL)");
        return;
    }
    with_pool(|pool| {
        let mut store = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
        let err = store.apply_transition(&TransitionApplication { entity_type: EntityType::Program,
                                                                  entity_id: Uuid::new_v4(),
                                                                  expected_from: "draft",
                                                                  to_state: "pending_approval",
                                                                  transition_id: "program.submit_for_approval",
                                                                  actor_user_id: Uuid::new_v4(),
                                                                  notes: "" })
                       .unwrap_err();
        assert_eq!(err, StoreError::EntityNotFound);
        assert!(store.get_entity(EntityType::Program, Uuid::new_v4()).unwrap().is_none());
        std::mem::forget(store);
    });
}

#[test]
fn duplicate_entity_id_is_rejected() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip duplicate_entity_id_is_rejected (no DATABASE_URL)");
        return;
    }
    with_pool(|pool| {
        let mut store = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
        let owner = Uuid::new_v4();
        let entity = fresh_program(owner);
        store.insert_entity(entity.clone(), owner, "").expect("first insert");
        let err = store.insert_entity(entity, owner, "").unwrap_err();
        assert_eq!(err, StoreError::DuplicateEntity);
        std::mem::forget(store);
    });
}
