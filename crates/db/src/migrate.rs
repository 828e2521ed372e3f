//! Schema migrations contributed by modules.

use crate::error::DbError;
use crate::store::{Executor, SqliteStore};
use crate::value::SqlValue;

/// Migration definition for modules.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
)";

impl SqliteStore {
    /// Apply pending migrations in the order given.
    ///
    /// Each migration runs in its own transaction together with its ledger
    /// entry, so a failing script leaves no partial schema behind and is
    /// retried on the next run. Returns the number of migrations applied.
    pub fn migrate(&self, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
        let mut conn = self.lock()?;
        conn.execute_batch(LEDGER_DDL)
            .map_err(|source| DbError::Execute { source })?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let already = Executor::query(
                &*conn,
                "SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2",
                &[SqlValue::from(module.as_str()), SqlValue::from(migration.id)],
            )?;
            if !already.is_empty() {
                tracing::debug!(module = %module, id = migration.id, "migration already applied");
                continue;
            }

            let failed = |source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            };

            let tx = conn.transaction().map_err(failed)?;
            tx.execute_batch(migration.up).map_err(failed)?;
            Executor::execute(
                &*tx,
                "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
                &[SqlValue::from(module.as_str()), SqlValue::from(migration.id)],
            )?;
            tx.commit().map_err(failed)?;

            tracing::info!(module = %module, id = migration.id, "applied migration");
            applied += 1;
        }

        Ok(applied)
    }
}
