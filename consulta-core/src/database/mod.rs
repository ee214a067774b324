//! Store-side collaborators of the pipeline
//!
//! The orchestrator only sees the two traits below. `SqliteDatabase` is the
//! implementation used by the CLI; `seed` builds the demo hospital store.

pub mod seed;
mod sqlite;

pub use sqlite::SqliteDatabase;

use crate::error::Result;
use crate::turn::TabularResult;

/// Describes the store to the model
pub trait SchemaProvider {
    /// Every user table's creation statement, in store order, separated by a
    /// blank line. Internal tables are left out.
    fn schema(&self) -> Result<String>;
}

/// Runs generated SQL
pub trait QueryExecutor {
    /// Fails with `Error::Query` carrying the store's message on malformed SQL,
    /// unknown tables or columns, and any other store-level error.
    fn execute(&self, sql: &str) -> Result<TabularResult>;
}
