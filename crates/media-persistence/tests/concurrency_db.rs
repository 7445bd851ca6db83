mod test_support;
use test_support::with_pool;

use chrono::Utc;
use media_core::store::{StoreError, TransitionApplication, WorkflowStore};
use media_persistence::pg::{PgWorkflowStore, PoolProvider};
use media_domain::{EntityType, WorkflowEntity};
use uuid::Uuid;

// Dos transiciones concurrentes desde el mismo estado: exactamente una gana;
// la otra observa el CAS viejo y pierde con StaleState. El historial queda con
// una sola rama (sin bifurcación).
#[test]
fn concurrent_transitions_serialize_on_the_entity_row() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip concurrent_transitions_serialize_on_the_entity_row (no DATABASE_URL)");
        return;
    }
    with_pool(|pool| {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let entity = WorkflowEntity { id: Uuid::new_v4(),
                                      entity_type: EntityType::Program,
                                      title: "Carrera".to_string(),
                                      owner_user_id: owner,
                                      current_state: "pending_approval".to_string(),
                                      created_at: now,
                                      updated_at: now };
        let entity_id = entity.id;
        {
            let mut setup = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
            setup.insert_entity(entity, owner, "").expect("seed entity");
            std::mem::forget(setup);
        }

        // approve y reject compiten desde pending_approval
        let mut handles = Vec::new();
        for (to_state, transition_id) in [("approved", "program.approve"), ("rejected", "program.reject")] {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                let mut store = PgWorkflowStore::new(PoolProvider { pool });
                let result = store.apply_transition(&TransitionApplication { entity_type: EntityType::Program,
                                                                             entity_id,
                                                                             expected_from: "pending_approval",
                                                                             to_state,
                                                                             transition_id,
                                                                             actor_user_id: Uuid::new_v4(),
                                                                             notes: "" });
                std::mem::forget(store);
                result
            }));
        }
        let results: Vec<Result<_, StoreError>> = handles.into_iter().map(|h| h.join().expect("join")).collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        let stale = results.iter()
                           .filter(|r| matches!(r, Err(StoreError::StaleState { .. })))
                           .count();
        println!("[concurrency] winners={winners} stale={stale}");
        assert_eq!(winners, 1, "exactamente una transición debe ganar: {results:?}");
        assert_eq!(stale, 1, "la perdedora debe observar el CAS viejo: {results:?}");

        let store = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
        let history = store.history_for(EntityType::Program, entity_id).expect("history");
        assert_eq!(history.len(), 2, "creación + una sola transición, sin rama divergente");
        let final_state = store.latest_state(EntityType::Program, entity_id).unwrap().unwrap();
        let entity_state = store.get_entity(EntityType::Program, entity_id).unwrap().unwrap().current_state;
        assert_eq!(final_state, entity_state, "invariante entidad/ledger tras la carrera");
        std::mem::forget(store);
    });
}
