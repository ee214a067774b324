//! SQLite schema provider and query executor
//!
//! No connection is held between calls: each operation opens the file, runs
//! and drops the connection before returning, so nothing stays open across a
//! model round trip.

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{QueryExecutor, SchemaProvider};
use crate::error::{Error, Result};
use crate::turn::{TabularResult, Value};

const USER_TABLES: &str =
    "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    path: PathBuf,
}

impl SqliteDatabase {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generated SQL only ever runs on a read-only connection.
    fn open_read_only(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Names of the user tables, in store order.
    pub fn tables(&self) -> Result<Vec<String>> {
        let conn = self.open_read_only()?;
        let mut stmt = conn.prepare(USER_TABLES)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

impl SchemaProvider for SqliteDatabase {
    fn schema(&self) -> Result<String> {
        let conn = self.open_read_only()?;
        let mut stmt = conn.prepare(USER_TABLES)?;
        let statements = stmt
            .query_map([], |row| row.get::<_, Option<String>>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(statements.into_iter().flatten().collect::<Vec<_>>().join("\n\n"))
    }
}

impl QueryExecutor for SqliteDatabase {
    fn execute(&self, sql: &str) -> Result<TabularResult> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(Error::query("empty statement"));
        }

        let conn = self.open_read_only()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(Value::from(row.get::<usize, SqlValue>(idx)?));
            }
            rows.push(values);
        }

        debug!(columns = width, rows = rows.len(), "Executed query");
        trace!(sql = %sql, "Executed statement");
        Ok(TabularResult::new(columns, rows))
    }
}
