//! SQLite store for the payroll workspace.
//!
//! Business logic depends on the [`Executor`] and [`Store`] traits; the
//! binaries wire in [`SqliteStore`].

pub mod error;
pub mod migrate;
pub mod store;
pub mod value;

pub use error::DbError;
pub use migrate::Migration;
pub use store::{Executor, SqliteStore, Store};
pub use value::{Row, SqlValue};
