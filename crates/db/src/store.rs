use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params_from_iter, Connection, TransactionBehavior};

use crate::error::DbError;
use crate::value::{Row, SqlValue};

/// Statement-level access to the relational store.
///
/// This is the surface business logic is written against: run a query and
/// get rows back, or run a mutation and learn how many rows it touched.
pub trait Executor {
    /// Run a read statement and collect every row it yields.
    fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError>;

    /// Run a mutating statement and return the number of affected rows.
    fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<usize, DbError>;
}

/// A shareable store that can also scope work to a single transaction.
pub trait Store: Executor + Send + Sync {
    /// Run `work` inside one transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back when
    /// it returns `Err`. The write lock is taken before `work` starts so a
    /// read followed by a write observes a consistent row state.
    fn transaction<T, F>(&self, work: F) -> Result<T, DbError>
    where
        F: FnOnce(&dyn Executor) -> Result<T, DbError>;
}

impl Executor for Connection {
    fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError> {
        let mut stmt = self
            .prepare_cached(statement)
            .map_err(|source| DbError::Query { source })?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(params))
            .map_err(|source| DbError::Query { source })?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|source| DbError::Query { source })? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = row
                    .get_ref(idx)
                    .map_err(|source| DbError::Query { source })?;
                values.push(SqlValue::from(value));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }

        Ok(out)
    }

    fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<usize, DbError> {
        let mut stmt = self
            .prepare_cached(statement)
            .map_err(|source| DbError::Execute { source })?;
        stmt.execute(params_from_iter(params))
            .map_err(|source| DbError::Execute { source })
    }
}

/// SQLite-backed store.
///
/// A single connection is shared behind a mutex; SQLite serialises writers
/// itself, the mutex only gives Rust exclusive access to the handle. Cloning
/// is cheap and every clone talks to the same database.
///
/// Connections are opened with foreign keys enforced. File-backed databases
/// use WAL journaling and a busy timeout so concurrent processes wait for
/// the write lock instead of failing immediately.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create or open a database file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path).map_err(|source| DbError::Open {
            path: path.clone(),
            source,
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|source| DbError::Configure { source })?;
        conn.busy_timeout(busy_timeout)
            .map_err(|source| DbError::Configure { source })?;
        Self::configure(&conn)?;

        tracing::info!(path = %path.display(), "opened sqlite store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::configure(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    fn configure(conn: &Connection) -> Result<(), DbError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|source| DbError::Configure { source })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }
}

impl Executor for SqliteStore {
    fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError> {
        let conn = self.lock()?;
        Executor::query(&*conn, statement, params)
    }

    fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<usize, DbError> {
        let conn = self.lock()?;
        Executor::execute(&*conn, statement, params)
    }
}

impl Store for SqliteStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, DbError>
    where
        F: FnOnce(&dyn Executor) -> Result<T, DbError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| DbError::Transaction { source })?;

        // Dropping `tx` on the error path rolls it back.
        let value = work(&*tx)?;

        tx.commit()
            .map_err(|source| DbError::Transaction { source })?;
        Ok(value)
    }
}
