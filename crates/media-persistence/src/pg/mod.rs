//! Implementaciones Postgres (Diesel) de los traits del core.
//!
//! Objetivo general del módulo:
//! - Proveer una capa de persistencia durable (Postgres) con paridad 1:1
//!   respecto al backend en memoria: misma semántica de CAS, mismo orden de
//!   historial, mismos errores observables en el ejecutor.
//! - Aislar completamente el mapeo dominio ↔ filas de DB del `media-core`.
//!
//! Puntos clave:
//! - `apply_transition`: `SELECT ... FOR UPDATE` sobre la fila de entidad +
//!   re-chequeo del from-state + insert de historial + update de
//!   `current_state`, todo dentro de UNA transacción read-write. Es la
//!   serialización por entidad exigida por el ejecutor.
//! - Historial append-only con orden total por `seq` (BIGSERIAL), sin updates
//!   ni deletes.
//! - Manejo básico de errores transitorios: reintento con backoff en las
//!   operaciones de lectura/escritura.
//! - `load_registry`: reconstruye el `StateRegistry` desde las tablas
//!   sembradas, con las mismas validaciones de escritura del core.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use serde_json::Value;
use uuid::Uuid;

use log::{debug, error, warn};
use media_core::notify::{NewNotification, Notification, NotificationKind, NotificationStore, UserDirectory};
use media_core::registry::{RecipientRule, StateRegistry, TransitionRule, WorkflowState};
use media_core::store::{HistoryRecord, StoreError, TransitionApplication, WorkflowStore};
use media_domain::{EntityType, Role, UserId, WorkflowEntity};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{directory_users, notifications, workflow_entities, workflow_history, workflow_states,
                    workflow_transitions};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo se corre automáticamente el set de migraciones pendientes
/// (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o
/// simular en tests unitarios sin acoplar a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}
impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes (dependen de driver/pg) llegan como Unknown con
        // texto; best-effort string match sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff exponencial muy pequeño (hasta 3 intentos).
/// No altera semántica de negocio; sólo repite la unidad de trabajo.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// ---------------------------------------------------------------------------
// Filas Diesel
// ---------------------------------------------------------------------------

/// Fila mapeada de `workflow_entities` para lecturas.
#[derive(Queryable, Debug)]
struct EntityRow {
    id: Uuid,
    entity_type: String,
    title: String,
    owner_user_id: Uuid,
    current_state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = workflow_entities)]
struct NewEntityRow<'a> {
    id: &'a Uuid,
    entity_type: &'a str,
    title: &'a str,
    owner_user_id: &'a Uuid,
    current_state: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fila mapeada de `workflow_history` para lecturas.
#[derive(Queryable, Debug)]
struct HistoryRow {
    seq: i64,
    entity_type: String,
    entity_id: Uuid,
    from_state: Option<String>,
    to_state: String,
    transition_id: Option<String>,
    actor_user_id: Uuid,
    notes: String,
    ts: DateTime<Utc>,
}

/// Fila para insertar en `workflow_history`. Se inserta siempre dentro de una
/// transacción (`build_transaction().read_write()`), devolviendo `seq` y `ts`
/// vía `RETURNING`.
#[derive(Insertable, Debug)]
#[diesel(table_name = workflow_history)]
struct NewHistoryRow<'a> {
    entity_type: &'a str,
    entity_id: &'a Uuid,
    from_state: Option<&'a str>,
    to_state: &'a str,
    transition_id: Option<&'a str>,
    actor_user_id: &'a Uuid,
    notes: &'a str,
}

#[derive(Queryable, Debug)]
struct NotificationRow {
    id: Uuid,
    recipient_user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    entity_type: String,
    entity_id: Uuid,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = notifications)]
struct NewNotificationRow<'a> {
    id: &'a Uuid,
    recipient_user_id: &'a Uuid,
    kind: &'a str,
    title: &'a str,
    message: &'a str,
    entity_type: &'a str,
    entity_id: &'a Uuid,
}

#[derive(Queryable, Debug)]
struct StateRow {
    entity_type: String,
    name: String,
    label: String,
    ord: i32,
    is_final: bool,
}

#[derive(Queryable, Debug)]
struct TransitionRow {
    id: String,
    entity_type: String,
    from_state: String,
    to_state: String,
    allowed_roles: Value,
    owner_override: bool,
    notify: Value,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Mapeos fila ↔ dominio
// ---------------------------------------------------------------------------

fn parse_entity_type(raw: &str) -> Result<EntityType, PersistenceError> {
    raw.parse::<EntityType>()
       .map_err(|e| PersistenceError::Unknown(format!("bad entity_type in row: {e}")))
}

fn entity_from_row(row: EntityRow) -> Result<WorkflowEntity, PersistenceError> {
    Ok(WorkflowEntity { id: row.id,
                        entity_type: parse_entity_type(&row.entity_type)?,
                        title: row.title,
                        owner_user_id: row.owner_user_id,
                        current_state: row.current_state,
                        created_at: row.created_at,
                        updated_at: row.updated_at })
}

fn history_from_row(row: HistoryRow) -> Result<HistoryRecord, PersistenceError> {
    Ok(HistoryRecord { seq: row.seq as u64,
                       entity_type: parse_entity_type(&row.entity_type)?,
                       entity_id: row.entity_id,
                       from_state: row.from_state,
                       to_state: row.to_state,
                       transition_id: row.transition_id,
                       actor_user_id: row.actor_user_id,
                       notes: row.notes,
                       ts: row.ts })
}

fn parse_kind(raw: &str) -> Result<NotificationKind, PersistenceError> {
    match raw {
        "approval_requested" => Ok(NotificationKind::ApprovalRequested),
        "state_changed" => Ok(NotificationKind::StateChanged),
        other => Err(PersistenceError::Unknown(format!("bad notification kind in row: {other}"))),
    }
}

fn notification_from_row(row: NotificationRow) -> Result<Notification, PersistenceError> {
    Ok(Notification { id: row.id,
                      recipient_user_id: row.recipient_user_id,
                      kind: parse_kind(&row.kind)?,
                      title: row.title,
                      message: row.message,
                      entity_type: parse_entity_type(&row.entity_type)?,
                      entity_id: row.entity_id,
                      is_read: row.is_read,
                      read_at: row.read_at,
                      created_at: row.created_at })
}

fn backend(e: PersistenceError) -> StoreError {
    StoreError::Backend(e.to_string())
}

// ---------------------------------------------------------------------------
// Store de workflow
// ---------------------------------------------------------------------------

/// Resultado interno de la transacción de `apply_transition`; permite
/// distinguir los fallos definitivos (CAS viejo, entidad ausente) de los
/// errores Diesel reintentables sin abusar del tipo de error.
enum ApplyOutcome {
    Applied(HistoryRecord),
    Missing,
    Stale { found: String },
}

/// Implementación Postgres de `WorkflowStore`.
///
/// Responsabilidades:
/// - `insert_entity` / `apply_transition`: escrituras todo-o-nada de entidad
///   + ledger (únicos escritores de `current_state`).
/// - `history_for` / `latest_state`: lecturas ordenadas por `seq`.
pub struct PgWorkflowStore<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgWorkflowStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> WorkflowStore for PgWorkflowStore<P> {
    fn insert_entity(&mut self, entity: WorkflowEntity, actor_user_id: UserId, notes: &str)
                     -> Result<HistoryRecord, StoreError> {
        debug!("insert_entity:start {} {}", entity.entity_type, entity.id);
        let type_str = entity.entity_type.as_str();
        let inserted: Result<HistoryRecord, PersistenceError> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    diesel::insert_into(workflow_entities::table)
                        .values(NewEntityRow { id: &entity.id,
                                               entity_type: type_str,
                                               title: &entity.title,
                                               owner_user_id: &entity.owner_user_id,
                                               current_state: &entity.current_state,
                                               created_at: entity.created_at,
                                               updated_at: entity.updated_at })
                        .execute(tx_conn)?;
                    // Registro de creación: from_state y transition_id nulos
                    let (seq, ts): (i64, DateTime<Utc>) =
                        diesel::insert_into(workflow_history::table)
                            .values(NewHistoryRow { entity_type: type_str,
                                                    entity_id: &entity.id,
                                                    from_state: None,
                                                    to_state: &entity.current_state,
                                                    transition_id: None,
                                                    actor_user_id: &actor_user_id,
                                                    notes })
                            .returning((workflow_history::seq, workflow_history::ts))
                            .get_result(tx_conn)?;
                    Ok::<_, diesel::result::Error>((seq, ts))
                })
                .map_err(PersistenceError::from)
        }).map(|(seq, ts)| HistoryRecord { seq: seq as u64,
                                           entity_type: entity.entity_type,
                                           entity_id: entity.id,
                                           from_state: None,
                                           to_state: entity.current_state.clone(),
                                           transition_id: None,
                                           actor_user_id,
                                           notes: notes.to_string(),
                                           ts });
        match inserted {
            Ok(record) => {
                debug!("insert_entity:done {} {} seq={}", entity.entity_type, entity.id, record.seq);
                Ok(record)
            }
            Err(PersistenceError::UniqueViolation(_)) => Err(StoreError::DuplicateEntity),
            Err(e) => Err(backend(e)),
        }
    }

    fn get_entity(&self, entity_type: EntityType, id: Uuid) -> Result<Option<WorkflowEntity>, StoreError> {
        let row: Option<EntityRow> = with_retry(|| {
                                         let mut conn = self.provider.connection()?;
                                         workflow_entities::table.filter(workflow_entities::id.eq(id))
                                                                 .filter(workflow_entities::entity_type.eq(entity_type.as_str()))
                                                                 .first(&mut conn)
                                                                 .optional()
                                                                 .map_err(PersistenceError::from)
                                     }).map_err(backend)?;
        row.map(|r| entity_from_row(r).map_err(backend)).transpose()
    }

    fn apply_transition(&mut self, req: &TransitionApplication<'_>) -> Result<HistoryRecord, StoreError> {
        debug!("apply:start {} {} {} -> {}",
               req.entity_type,
               req.entity_id,
               req.expected_from,
               req.to_state);
        let type_str = req.entity_type.as_str();
        let outcome: ApplyOutcome = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    // Lock de fila: serializa transiciones concurrentes sobre
                    // la misma entidad.
                    let row: Option<EntityRow> =
                        workflow_entities::table.filter(workflow_entities::id.eq(req.entity_id))
                                                .filter(workflow_entities::entity_type.eq(type_str))
                                                .for_update()
                                                .first(tx_conn)
                                                .optional()?;
                    let row = match row {
                        Some(r) => r,
                        None => return Ok(ApplyOutcome::Missing),
                    };
                    // CAS: re-chequeo del from-state bajo el lock
                    if row.current_state != req.expected_from {
                        return Ok(ApplyOutcome::Stale { found: row.current_state });
                    }
                    let (seq, ts): (i64, DateTime<Utc>) =
                        diesel::insert_into(workflow_history::table)
                            .values(NewHistoryRow { entity_type: type_str,
                                                    entity_id: &req.entity_id,
                                                    from_state: Some(req.expected_from),
                                                    to_state: req.to_state,
                                                    transition_id: Some(req.transition_id),
                                                    actor_user_id: &req.actor_user_id,
                                                    notes: req.notes })
                            .returning((workflow_history::seq, workflow_history::ts))
                            .get_result(tx_conn)?;
                    diesel::update(workflow_entities::table.filter(workflow_entities::id.eq(req.entity_id))
                                                           .filter(workflow_entities::entity_type.eq(type_str)))
                        .set((workflow_entities::current_state.eq(req.to_state),
                              workflow_entities::updated_at.eq(ts)))
                        .execute(tx_conn)?;
                    Ok::<_, diesel::result::Error>(ApplyOutcome::Applied(HistoryRecord {
                        seq: seq as u64,
                        entity_type: req.entity_type,
                        entity_id: req.entity_id,
                        from_state: Some(req.expected_from.to_string()),
                        to_state: req.to_state.to_string(),
                        transition_id: Some(req.transition_id.to_string()),
                        actor_user_id: req.actor_user_id,
                        notes: req.notes.to_string(),
                        ts,
                    }))
                })
                .map_err(PersistenceError::from)
        }).map_err(backend)?;
        match outcome {
            ApplyOutcome::Applied(record) => {
                debug!("apply:done {} {} seq={}", req.entity_type, req.entity_id, record.seq);
                Ok(record)
            }
            ApplyOutcome::Missing => Err(StoreError::EntityNotFound),
            ApplyOutcome::Stale { found } => Err(StoreError::StaleState { expected: req.expected_from.to_string(),
                                                                          found }),
        }
    }

    fn history_for(&self, entity_type: EntityType, id: Uuid) -> Result<Vec<HistoryRecord>, StoreError> {
        let rows: Vec<HistoryRow> = with_retry(|| {
                                        let mut conn = self.provider.connection()?;
                                        workflow_history::table.filter(workflow_history::entity_id.eq(id))
                                                               .filter(workflow_history::entity_type.eq(entity_type.as_str()))
                                                               .order(workflow_history::seq.asc())
                                                               .load(&mut conn)
                                                               .map_err(PersistenceError::from)
                                    }).map_err(backend)?;
        rows.into_iter()
            .map(|r| history_from_row(r).map_err(backend))
            .collect()
    }

    fn latest_state(&self, entity_type: EntityType, id: Uuid) -> Result<Option<String>, StoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            workflow_history::table.filter(workflow_history::entity_id.eq(id))
                                   .filter(workflow_history::entity_type.eq(entity_type.as_str()))
                                   .order(workflow_history::seq.desc())
                                   .select(workflow_history::to_state)
                                   .first::<String>(&mut conn)
                                   .optional()
                                   .map_err(PersistenceError::from)
        }).map_err(backend)
    }
}

// ---------------------------------------------------------------------------
// Store de notificaciones
// ---------------------------------------------------------------------------

/// Implementación Postgres de `NotificationStore`. Los ids se generan del
/// lado cliente; `created_at`/`is_read` quedan en sus DEFAULT.
pub struct PgNotificationStore<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgNotificationStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> NotificationStore for PgNotificationStore<P> {
    fn insert(&mut self, new: NewNotification) -> Result<Notification, StoreError> {
        let id = Uuid::new_v4();
        let row: NotificationRow = with_retry(|| {
                                       let mut conn = self.provider.connection()?;
                                       diesel::insert_into(notifications::table)
                                           .values(NewNotificationRow { id: &id,
                                                                        recipient_user_id: &new.recipient_user_id,
                                                                        kind: new.kind.as_str(),
                                                                        title: &new.title,
                                                                        message: &new.message,
                                                                        entity_type: new.entity_type.as_str(),
                                                                        entity_id: &new.entity_id })
                                           .get_result(&mut conn)
                                           .map_err(PersistenceError::from)
                                   }).map_err(backend)?;
        notification_from_row(row).map_err(backend)
    }

    fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>, StoreError> {
        let rows: Vec<NotificationRow> = with_retry(|| {
                                             let mut conn = self.provider.connection()?;
                                             notifications::table.filter(notifications::recipient_user_id.eq(user_id))
                                                                 .order(notifications::created_at.desc())
                                                                 .load(&mut conn)
                                                                 .map_err(PersistenceError::from)
                                         }).map_err(backend)?;
        rows.into_iter()
            .map(|r| notification_from_row(r).map_err(backend))
            .collect()
    }

    fn unread_count(&self, user_id: UserId) -> Result<usize, StoreError> {
        let count: i64 = with_retry(|| {
                             let mut conn = self.provider.connection()?;
                             notifications::table.filter(notifications::recipient_user_id.eq(user_id))
                                                 .filter(notifications::is_read.eq(false))
                                                 .count()
                                                 .get_result(&mut conn)
                                                 .map_err(PersistenceError::from)
                         }).map_err(backend)?;
        Ok(count as usize)
    }

    fn mark_read(&mut self, id: Uuid, user_id: UserId) -> Result<bool, StoreError> {
        let updated = with_retry(|| {
                          let mut conn = self.provider.connection()?;
                          diesel::update(notifications::table.filter(notifications::id.eq(id))
                                                             .filter(notifications::recipient_user_id.eq(user_id))
                                                             .filter(notifications::is_read.eq(false)))
                              .set((notifications::is_read.eq(true),
                                    notifications::read_at.eq(Some(Utc::now()))))
                              .execute(&mut conn)
                              .map_err(PersistenceError::from)
                      }).map_err(backend)?;
        if updated > 0 {
            return Ok(true);
        }
        // Ya leída cuenta como existente; ajena o inexistente, no
        let exists: i64 = with_retry(|| {
                              let mut conn = self.provider.connection()?;
                              notifications::table.filter(notifications::id.eq(id))
                                                  .filter(notifications::recipient_user_id.eq(user_id))
                                                  .count()
                                                  .get_result(&mut conn)
                                                  .map_err(PersistenceError::from)
                          }).map_err(backend)?;
        Ok(exists > 0)
    }
}

// ---------------------------------------------------------------------------
// Directorio de usuarios
// ---------------------------------------------------------------------------

/// Lookup de sólo lectura sobre `directory_users`. Best-effort: ante un fallo
/// de storage devuelve vacío y loguea (el dispatcher ya es best-effort).
pub struct PgUserDirectory<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgUserDirectory<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> UserDirectory for PgUserDirectory<P> {
    fn users_with_role(&self, role: Role) -> Vec<UserId> {
        let result = with_retry(|| {
            let mut conn = self.provider.connection()?;
            directory_users::table.filter(directory_users::role.eq(role.as_str()))
                                  .select(directory_users::user_id)
                                  .load::<Uuid>(&mut conn)
                                  .map_err(PersistenceError::from)
        });
        match result {
            Ok(users) => users,
            Err(e) => {
                error!("users_with_role({role}) failed: {e}");
                vec![]
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Carga del registro
// ---------------------------------------------------------------------------

/// Reconstruye el `StateRegistry` desde las tablas sembradas.
///
/// Aplica las mismas validaciones de escritura que el core (`add_state` /
/// `add_transition`): un sembrado inconsistente se rechaza acá, no en runtime.
pub fn load_registry<P: ConnectionProvider>(provider: &P) -> Result<StateRegistry, PersistenceError> {
    let mut conn = provider.connection()?;
    let state_rows: Vec<StateRow> = workflow_states::table.order((workflow_states::entity_type.asc(),
                                                                  workflow_states::ord.asc()))
                                                          .load(&mut conn)
                                                          .map_err(PersistenceError::from)?;
    let transition_rows: Vec<TransitionRow> = workflow_transitions::table.order(workflow_transitions::created_at.asc())
                                                                         .load(&mut conn)
                                                                         .map_err(PersistenceError::from)?;
    let mut registry = StateRegistry::new();
    for row in state_rows {
        let entity_type = parse_entity_type(&row.entity_type)?;
        registry.add_state(entity_type,
                           WorkflowState { name: row.name,
                                           label: row.label,
                                           order: row.ord as u32,
                                           is_final: row.is_final })
                .map_err(|e| PersistenceError::Unknown(format!("bad seeded state: {e}")))?;
    }
    for row in transition_rows {
        let entity_type = parse_entity_type(&row.entity_type)?;
        let allowed_roles: Vec<Role> = serde_json::from_value(row.allowed_roles)
            .map_err(|e| PersistenceError::Unknown(format!("bad allowed_roles for {}: {e}", row.id)))?;
        let notify: Vec<RecipientRule> = serde_json::from_value(row.notify)
            .map_err(|e| PersistenceError::Unknown(format!("bad notify for {}: {e}", row.id)))?;
        registry.add_transition(TransitionRule { id: row.id.clone(),
                                                 entity_type,
                                                 from_state: row.from_state,
                                                 to_state: row.to_state,
                                                 allowed_roles,
                                                 owner_override: row.owner_override,
                                                 notify })
                .map_err(|e| PersistenceError::Unknown(format!("bad seeded transition {}: {e}", row.id)))?;
    }
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`).
/// - Ejecuta migraciones inmediatamente tras el primer `get()`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    // Ejecutar migraciones una sola vez al construir (primer connection checkout).
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
