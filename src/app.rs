//! Application bootstrap: open the store, run the module lifecycle, serve.

use anyhow::Context;
use payroll_db::SqliteStore;
use payroll_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A store with every module initialized, migrated, and started.
pub struct Application {
    settings: Settings,
    store: SqliteStore,
    registry: ModuleRegistry,
}

impl Application {
    /// Open the configured database file and bring every module up.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&settings.database.path, settings.database.busy_timeout())
            .with_context(|| {
                format!(
                    "failed to open database at {}",
                    settings.database.path.display()
                )
            })?;
        Self::bootstrap_with_store(settings, store).await
    }

    /// Bring every module up against an already opened store.
    pub async fn bootstrap_with_store(settings: Settings, store: SqliteStore) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &store);

        {
            let ctx = InitCtx {
                settings: &settings,
                store: &store,
            };
            registry.init_modules(&ctx).await?;

            registry.apply_migrations(&store)?;

            registry.start_modules(&ctx).await?;
        }

        tracing::info!("payroll bootstrap complete");
        Ok(Self {
            settings,
            store,
            registry,
        })
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serve HTTP until Ctrl-C, then stop every module.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = payroll_http::start_server(&self.registry, &self.settings).await;
        self.finish(served).await
    }

    /// Stop every module once a one-shot command has run, failed or not.
    pub async fn finish<T>(&self, result: anyhow::Result<T>) -> anyhow::Result<T> {
        self.registry.stop_after(result).await
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_modules().await
    }
}
