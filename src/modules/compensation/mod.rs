//! Salary adjustments and performance bonuses over the employee directory.

pub mod adjuster;
pub mod bonus;
pub mod directory;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use payroll_db::SqliteStore;
use payroll_kernel::{InitCtx, Migration, Module};

pub use adjuster::SalaryAdjuster;
pub use bonus::{bonus_rate, BonusCalculator};
pub use error::CompensationError;
pub use models::{BonusLine, Employee, OperationOutcome, OutcomeKind};

/// Departments and employees. Salaries are kept as decimal text so SQLite's
/// numeric affinity cannot turn them into floats.
pub(crate) fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_departments",
            up: r#"
                CREATE TABLE departments (
                    department_id   INTEGER PRIMARY KEY,
                    department_name TEXT NOT NULL UNIQUE
                );
                "#,
        },
        Migration {
            id: "002_employees",
            up: r#"
                CREATE TABLE employees (
                    employee_id   INTEGER PRIMARY KEY,
                    first_name    TEXT NOT NULL,
                    last_name     TEXT NOT NULL,
                    salary        TEXT NOT NULL,
                    department_id INTEGER REFERENCES departments (department_id)
                );
                CREATE INDEX employees_department ON employees (department_id);
                "#,
        },
    ]
}

pub struct CompensationModule {
    store: SqliteStore,
}

impl CompensationModule {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for CompensationModule {
    fn name(&self) -> &'static str {
        "compensation"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = ?ctx.store.path(),
            "compensation module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(routes::openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        schema_migrations()
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.database.seed_sample_data {
            let store = ctx.store.clone();
            let inserted = tokio::task::spawn_blocking(move || seed::seed_sample_data(&store))
                .await
                .context("sample data task panicked")?
                .context("failed to seed sample data")?;
            if inserted > 0 {
                tracing::info!(module = self.name(), inserted, "seeded sample employees");
            }
        }

        tracing::info!(module = self.name(), "compensation module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "compensation module stopped");
        Ok(())
    }
}

/// Create a new instance of the compensation module
pub fn create_module(store: SqliteStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CompensationModule::new(store))
}
