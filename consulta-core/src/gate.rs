//! Read-only enforcement for generated SQL
//!
//! A prefix check on the normalized statement text, not a SQL parser.
//! Statements that hide a forbidden keyword behind a leading comment (e.g.
//! `/* x */ DROP TABLE t`) or put it after a read (`SELECT 1; DELETE ...`)
//! are not caught here.

use crate::error::{Error, Result};

/// Statement keywords that modify the store
pub const FORBIDDEN_KEYWORDS: [&str; 8] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "REPLACE",
];

/// The forbidden keyword `sql` starts with, if any, after trimming and uppercasing.
pub fn forbidden_prefix(sql: &str) -> Option<&'static str> {
    let normalized = sql.trim().to_uppercase();
    FORBIDDEN_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| normalized.starts_with(keyword))
}

pub fn is_allowed(sql: &str) -> bool {
    forbidden_prefix(sql).is_none()
}

/// `Err(UnsafeQueryRefused)` when `sql` starts with a forbidden keyword.
pub fn authorize(sql: &str) -> Result<()> {
    match forbidden_prefix(sql) {
        Some(keyword) => Err(Error::UnsafeQueryRefused { keyword }),
        None => Ok(()),
    }
}
