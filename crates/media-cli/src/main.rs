use std::str::FromStr;

use media_core::notify::NotificationStore;
use media_core::{WorkflowEngine, WorkflowError};
use media_domain::{Actor, EntityType, NewEntity, Role};
use uuid::Uuid;

// CLI mínima sobre el backend persistente:
//   media-cli create     --type <T> --title <TXT> --owner <UUID> --user <UUID> --role <ROL>
//   media-cli transition --type <T> --id <UUID> --to <ESTADO> --user <UUID> --role <ROL> [--notes <TXT>]
//   media-cli history    --type <T> --id <UUID>
//   media-cli inbox      --user <UUID>
// Códigos de salida: 2 uso, 4 error de cliente, 5 error de backend.

struct Flags {
    entity_type: Option<EntityType>,
    id: Option<Uuid>,
    to: Option<String>,
    user: Option<Uuid>,
    role: Option<Role>,
    title: Option<String>,
    owner: Option<Uuid>,
    notes: Option<String>,
}

fn parse_flags(args: &[String]) -> Flags {
    let mut flags = Flags { entity_type: None,
                            id: None,
                            to: None,
                            user: None,
                            role: None,
                            title: None,
                            owner: None,
                            notes: None };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--type" => {
                i += 1;
                if i < args.len() { flags.entity_type = EntityType::from_str(&args[i]).ok(); }
            }
            "--id" => {
                i += 1;
                if i < args.len() { flags.id = Uuid::parse_str(&args[i]).ok(); }
            }
            "--to" => {
                i += 1;
                if i < args.len() { flags.to = Some(args[i].clone()); }
            }
            "--user" => {
                i += 1;
                if i < args.len() { flags.user = Uuid::parse_str(&args[i]).ok(); }
            }
            "--role" => {
                i += 1;
                if i < args.len() { flags.role = Role::from_str(&args[i]).ok(); }
            }
            "--title" => {
                i += 1;
                if i < args.len() { flags.title = Some(args[i].clone()); }
            }
            "--owner" => {
                i += 1;
                if i < args.len() { flags.owner = Uuid::parse_str(&args[i]).ok(); }
            }
            "--notes" => {
                i += 1;
                if i < args.len() { flags.notes = Some(args[i].clone()); }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

type PgEngine = WorkflowEngine<media_persistence::PgWorkflowStore<media_persistence::PoolProvider>,
                               media_persistence::PgNotificationStore<media_persistence::PoolProvider>,
                               media_persistence::PgUserDirectory<media_persistence::PoolProvider>>;

/// Arma el motor contra Postgres; requiere DATABASE_URL.
fn build_engine() -> Result<PgEngine, String> {
    if std::env::var("DATABASE_URL").is_err() {
        return Err("requiere DATABASE_URL para operar contra backend persistente".to_string());
    }
    let pool = media_persistence::build_dev_pool_from_env().map_err(|e| format!("pool error: {e}"))?;
    let registry = media_persistence::load_registry(&media_persistence::PoolProvider { pool: pool.clone() })
        .map_err(|e| format!("registry load error: {e}"))?;
    let store = media_persistence::PgWorkflowStore::new(media_persistence::PoolProvider { pool: pool.clone() });
    let notifications = media_persistence::PgNotificationStore::new(media_persistence::PoolProvider { pool: pool.clone() });
    let directory = media_persistence::PgUserDirectory::new(media_persistence::PoolProvider { pool });
    Ok(WorkflowEngine::new(registry, store, notifications, directory))
}

fn exit_code_for(err: &WorkflowError) -> i32 {
    if err.is_client_error() { 4 } else { 5 }
}

fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("media-cli: use 'create', 'transition', 'history' or 'inbox' subcommands");
        std::process::exit(2);
    }
    let flags = parse_flags(&args[2..]);
    match args[1].as_str() {
        "create" => {
            let (entity_type, title, owner, user, role) =
                match (flags.entity_type, flags.title, flags.owner, flags.user, flags.role) {
                    (Some(t), Some(title), Some(owner), Some(user), Some(role)) => (t, title, owner, user, role),
                    _ => {
                        eprintln!("Uso: media-cli create --type <T> --title <TXT> --owner <UUID> --user <UUID> --role <ROL>");
                        std::process::exit(2);
                    }
                };
            let mut engine = match build_engine() {
                Ok(e) => e,
                Err(msg) => { eprintln!("[media-cli create] {msg}"); std::process::exit(5); }
            };
            let new = match NewEntity::new(entity_type, title, owner) {
                Ok(n) => n,
                Err(e) => { eprintln!("[media-cli create] {e}"); std::process::exit(4); }
            };
            match engine.create(new, Actor::new(user, role)) {
                Ok((entity, record)) => {
                    println!("creado: {} {} estado='{}' seq={}",
                             entity.entity_type, entity.id, entity.current_state, record.seq);
                }
                Err(e) => { eprintln!("error: {e}"); std::process::exit(exit_code_for(&e)); }
            }
        }
        "transition" => {
            let (entity_type, id, to, user, role) = match (flags.entity_type, flags.id, flags.to, flags.user, flags.role) {
                (Some(t), Some(id), Some(to), Some(user), Some(role)) => (t, id, to, user, role),
                _ => {
                    eprintln!("Uso: media-cli transition --type <T> --id <UUID> --to <ESTADO> --user <UUID> --role <ROL> [--notes <TXT>]");
                    std::process::exit(2);
                }
            };
            let mut engine = match build_engine() {
                Ok(e) => e,
                Err(msg) => { eprintln!("[media-cli transition] {msg}"); std::process::exit(5); }
            };
            let notes = flags.notes.unwrap_or_default();
            match engine.execute(entity_type, id, &to, Actor::new(user, role), &notes) {
                Ok(receipt) => {
                    println!("aplicada: {} {} -> '{}' seq={} notificaciones={}",
                             entity_type, id, receipt.entity.current_state, receipt.record.seq, receipt.notifications);
                }
                Err(e) => {
                    if let WorkflowError::InvalidTransition { ref current, ref allowed, .. } = e {
                        eprintln!("error: {e} (estado actual '{current}', alcanzables: {allowed:?})");
                    } else {
                        eprintln!("error: {e}");
                    }
                    std::process::exit(exit_code_for(&e));
                }
            }
        }
        "history" => {
            let (entity_type, id) = match (flags.entity_type, flags.id) {
                (Some(t), Some(id)) => (t, id),
                _ => {
                    eprintln!("Uso: media-cli history --type <T> --id <UUID>");
                    std::process::exit(2);
                }
            };
            let engine = match build_engine() {
                Ok(e) => e,
                Err(msg) => { eprintln!("[media-cli history] {msg}"); std::process::exit(5); }
            };
            match engine.history(entity_type, id) {
                Ok(records) => {
                    for r in records {
                        println!("seq={} {} -> '{}' actor={} ts={} notes={:?}",
                                 r.seq,
                                 r.from_state.as_deref().unwrap_or("(alta)"),
                                 r.to_state,
                                 r.actor_user_id,
                                 r.ts,
                                 r.notes);
                    }
                }
                Err(e) => { eprintln!("error: {e}"); std::process::exit(exit_code_for(&e)); }
            }
        }
        "inbox" => {
            let user = match flags.user {
                Some(u) => u,
                None => {
                    eprintln!("Uso: media-cli inbox --user <UUID>");
                    std::process::exit(2);
                }
            };
            let engine = match build_engine() {
                Ok(e) => e,
                Err(msg) => { eprintln!("[media-cli inbox] {msg}"); std::process::exit(5); }
            };
            match engine.notifications().list_for(user) {
                Ok(inbox) => {
                    for n in inbox {
                        let mark = if n.is_read { " " } else { "*" };
                        println!("{mark} [{}] {}: {} ({} {})",
                                 n.kind.as_str(), n.title, n.message, n.entity_type, n.entity_id);
                    }
                }
                Err(e) => { eprintln!("error: {e}"); std::process::exit(5); }
            }
        }
        other => {
            eprintln!("subcomando desconocido: {other}");
            println!("media-cli: use 'create', 'transition', 'history' or 'inbox' subcommands");
            std::process::exit(2);
        }
    }
}
