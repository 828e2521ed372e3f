//! Fixtures shared by the compensation tests.

use payroll_db::{Executor, SqlValue, SqliteStore};
use rust_decimal::Decimal;

use super::{schema_migrations, seed::seed_sample_data};

pub fn d(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// In-memory store with the compensation schema and no rows.
pub fn migrated_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let migrations: Vec<_> = schema_migrations()
        .into_iter()
        .map(|migration| ("compensation".to_string(), migration))
        .collect();
    store.migrate(&migrations).expect("schema migrations");
    store
}

/// In-memory store holding the sample departments and employees.
pub fn seeded_store() -> SqliteStore {
    let store = migrated_store();
    seed_sample_data(&store).expect("sample data");
    store
}

/// Stored salary text, exactly as persisted.
pub fn stored_salary(store: &SqliteStore, employee_id: i64) -> String {
    let rows = store
        .query(
            "SELECT salary FROM employees WHERE employee_id = ?1",
            &[SqlValue::Integer(employee_id)],
        )
        .expect("salary query");
    rows.first()
        .expect("employee row")
        .get_text("salary")
        .expect("salary text")
}
