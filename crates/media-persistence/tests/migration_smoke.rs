mod test_support;
use test_support::with_pool;

use diesel::prelude::*;

// Smoke: el pool corre migraciones al construirse y las tablas existen.
#[test]
fn migrations_create_workflow_tables() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip migrations_create_workflow_tables (no DATABASE_URL)");
        return;
    }
    let ran = with_pool(|pool| {
        let mut conn = pool.get().expect("conn");
        for table in ["workflow_states",
                      "workflow_transitions",
                      "workflow_entities",
                      "workflow_history",
                      "notifications",
                      "directory_users"]
        {
            let exists: bool =
                diesel::select(diesel::dsl::sql::<diesel::sql_types::Bool>(&format!("EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = '{table}')")))
                    .get_result(&mut conn)
                    .expect("query information_schema");
            assert!(exists, "falta la tabla {table}");
        }
    });
    assert!(ran.is_some(), "pool no disponible con DATABASE_URL definido");
}
