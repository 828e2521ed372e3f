use anyhow::Context;
use std::sync::Arc;

use payroll_db::SqliteStore;

use crate::module::{InitCtx, Migration, Module};

/// Module registry driving the module lifecycle.
///
/// Modules are initialized and started in registration order and stopped in
/// reverse order.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// All registered modules in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop every module once `result` is settled.
    ///
    /// Modules are stopped whether or not `result` is an error; the original
    /// error wins over a failure to stop.
    pub async fn stop_after<T>(&self, result: anyhow::Result<T>) -> anyhow::Result<T> {
        let stopped = self.stop_modules().await;
        match (result, stopped) {
            (Ok(value), stopped) => stopped.map(|()| value),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(stop_err)) => {
                tracing::error!(error = %format!("{stop_err:#}"), "failed to stop modules");
                Err(err)
            }
        }
    }

    /// Collect all migrations, grouped by module in registration order.
    ///
    /// Within a module, migrations are ordered by id.
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations = Vec::new();

        for module in &self.modules {
            let mut own = module.migrations();
            own.sort_by(|a, b| a.id.cmp(b.id));
            migrations.extend(
                own.into_iter()
                    .map(|migration| (module.name().to_string(), migration)),
            );
        }

        migrations
    }

    /// Apply every pending migration to the store.
    pub fn apply_migrations(&self, store: &SqliteStore) -> anyhow::Result<usize> {
        let migrations = self.collect_migrations();
        let applied = store
            .migrate(&migrations)
            .context("failed to apply module migrations")?;

        tracing::info!(
            applied,
            total = migrations.len(),
            "schema migrations complete"
        );
        Ok(applied)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use payroll_db::Executor;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX widgets_label ON widgets (label);",
                },
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE widgets (id INTEGER PRIMARY KEY, label TEXT);",
                },
            ]
        }
    }

    struct StopTracker {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl Module for StopTracker {
        fn name(&self) -> &'static str {
            "tracker"
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_ordered_by_id_within_module() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "widgets" }));

        let ids: Vec<_> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| format!("{module}/{}", migration.id))
            .collect();
        assert_eq!(ids, vec!["widgets/001_init", "widgets/002_index"]);
    }

    #[test]
    fn apply_migrations_creates_schema() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "widgets" }));
        let store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(registry.apply_migrations(&store).unwrap(), 2);
        assert_eq!(registry.apply_migrations(&store).unwrap(), 0);
        assert!(store.query("SELECT id FROM widgets", &[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_module_lifecycle() {
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let store = SqliteStore::open_in_memory().unwrap();
        let ctx = InitCtx {
            settings: &settings,
            store: &store,
        };

        registry.register(Arc::new(TestModule { name: "test" }));

        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();
    }

    #[tokio::test]
    async fn stop_after_stops_modules_and_keeps_the_error() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(StopTracker {
            stopped: stopped.clone(),
        }));

        let result: anyhow::Result<()> = registry
            .stop_after(Err(anyhow::anyhow!("command failed")))
            .await;

        assert_eq!(result.unwrap_err().to_string(), "command failed");
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stop_after_passes_values_through() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(StopTracker {
            stopped: stopped.clone(),
        }));

        assert_eq!(registry.stop_after(Ok(7)).await.unwrap(), 7);
        assert!(stopped.load(Ordering::SeqCst));
    }
}
