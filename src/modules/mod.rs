pub mod compensation;

use payroll_db::SqliteStore;
use payroll_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: &SqliteStore) {
    registry.register(compensation::create_module(store.clone()));
}
