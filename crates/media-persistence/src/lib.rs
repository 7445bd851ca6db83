//! media-persistence
//!
//! Implementaciones Postgres (Diesel) de los contratos del core con paridad
//! 1:1 respecto al backend en memoria: misma semántica de CAS, mismo orden de
//! historial, mismos errores observables.
//!
//! Módulos:
//! - `pg`: stores sobre Postgres (entidades + historial append-only,
//!   notificaciones, directorio de usuarios, carga del registro sembrado).
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, load_registry, ConnectionProvider, PgNotificationStore, PgPool,
             PgUserDirectory, PgWorkflowStore, PoolProvider};
