use media_core::notify::{InMemoryUserDirectory, NotificationStore};
use media_core::{WorkflowEngine, WorkflowError};
use media_domain::{Actor, EntityType, NewEntity, Role};
use uuid::Uuid;

/// Validación del ciclo de aprobación de programas contra el backend en
/// memoria: alta -> envío -> intento prohibido -> aprobación, verificando
/// historial, notificaciones e invariante entidad/ledger.
fn run_program_lifecycle_validation() {
    let manager = Actor::new(Uuid::new_v4(), Role::ProgramManager);
    let producer = Actor::new(Uuid::new_v4(), Role::Producer);
    let employee = Actor::new(Uuid::new_v4(), Role::Employee);
    let directory = InMemoryUserDirectory::new().with_user(producer.user_id, Role::Producer);
    let mut engine = WorkflowEngine::in_memory(directory);

    let (program, _) = engine.create(NewEntity::new(EntityType::Program, "Programa 42", manager.user_id).expect("new entity"),
                                     manager)
                             .expect("create ok");
    println!("Programa creado: {} en '{}'", program.id, program.current_state);

    let receipt = engine.execute(EntityType::Program, program.id, "pending_approval", manager, "ready for review")
                        .expect("submit ok");
    println!("Enviado a aprobación: notificaciones={}", receipt.notifications);
    assert_eq!(receipt.notifications, 1, "el productor debe ser notificado");

    // Un empleado no puede aprobar: ForbiddenError y el estado no cambia
    let err = engine.execute(EntityType::Program, program.id, "approved", employee, "")
                    .expect_err("employee must be rejected");
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
    println!("Intento de empleado rechazado: {err}");

    let receipt = engine.execute(EntityType::Program, program.id, "approved", producer, "looks good")
                        .expect("approve ok");
    assert_eq!(receipt.entity.current_state, "approved");

    let history = engine.history(EntityType::Program, program.id).expect("history ok");
    assert_eq!(history.len(), 3, "alta + dos transiciones");
    engine.verify_consistency(EntityType::Program, program.id)
          .expect("entidad y ledger deben coincidir");
    let inbox = engine.notifications().list_for(manager.user_id).expect("inbox ok");
    assert!(!inbox.is_empty(), "el submitter recibe el resultado");
    println!("!Validación ciclo de programa: OK (historial={}, inbox submitter={})",
             history.len(),
             inbox.len());
}

/// Demo opcional contra Postgres: mismo escenario usando los stores Diesel,
/// el registro sembrado y el directorio demo.
fn maybe_run_pg_demo() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[PG DEMO] DATABASE_URL no definido; omitiendo demo PG");
        return;
    }
    if let Err(e) = pg_demo::run() {
        eprintln!("[PG DEMO] Error: {e}");
    } else {
        println!("[PG DEMO] OK");
    }
}

mod pg_demo {
    use super::*;
    use media_persistence::{build_dev_pool_from_env, load_registry, PgNotificationStore, PgUserDirectory,
                            PgWorkflowStore, PoolProvider};

    pub fn run() -> Result<(), String> {
        let pool = build_dev_pool_from_env().map_err(|e| e.to_string())?;
        let registry = load_registry(&PoolProvider { pool: pool.clone() }).map_err(|e| e.to_string())?;
        let store = PgWorkflowStore::new(PoolProvider { pool: pool.clone() });
        let notifications = PgNotificationStore::new(PoolProvider { pool: pool.clone() });
        let directory = PgUserDirectory::new(PoolProvider { pool });
        let mut engine = WorkflowEngine::new(registry, store, notifications, directory);

        // Actores: el manager demo sembrado y el productor demo
        let manager = Actor::new(Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
                                 Role::ProgramManager);
        let producer = Actor::new(Uuid::parse_str("33333333-3333-3333-3333-333333333333").unwrap(),
                                  Role::Producer);

        let (program, _) = engine.create(NewEntity::new(EntityType::Program, "Demo PG", manager.user_id)
                                             .map_err(|e| e.to_string())?,
                                         manager)
                                 .map_err(|e| e.to_string())?;
        let receipt = engine.execute(EntityType::Program, program.id, "pending_approval", manager, "demo")
                            .map_err(|e| e.to_string())?;
        println!("[PG] enviado: estado='{}' notificaciones={}",
                 receipt.entity.current_state, receipt.notifications);
        let receipt = engine.execute(EntityType::Program, program.id, "approved", producer, "ok")
                            .map_err(|e| e.to_string())?;
        println!("[PG] aprobado: estado='{}'", receipt.entity.current_state);
        let history = engine.history(EntityType::Program, program.id).map_err(|e| e.to_string())?;
        if history.len() != 3 {
            return Err(format!("historial inesperado: {}", history.len()));
        }
        engine.verify_consistency(EntityType::Program, program.id)
              .map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn main() {
    // Cargar variables de entorno desde .env si existe (antes de leer DATABASE_URL)
    let _ = dotenvy::dotenv();

    println!("--- Iniciando validación ciclo de programa (in-memory) ---");
    run_program_lifecycle_validation();

    // Demo PG opt-in para no requerir base en entornos sin Postgres
    if std::env::var("MEDIAFLOW_RUN_PG_DEMO").ok().as_deref() == Some("1") {
        maybe_run_pg_demo();
    } else {
        eprintln!("[PG DEMO] Skipping (set MEDIAFLOW_RUN_PG_DEMO=1 to enable)");
    }
}
