//! Conversation turns and the tabular results attached to them

use std::fmt;

/// A single cell of a query result
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<rusqlite::types::Value> for Value {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value as Sql;
        match value {
            Sql::Null => Value::Null,
            Sql::Integer(i) => Value::Integer(i),
            Sql::Real(r) => Value::Real(r),
            Sql::Text(s) => Value::Text(s),
            Sql::Blob(b) => Value::Blob(b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// Ordered columns and column-aligned rows returned by a query.
///
/// Zero rows is a valid result, distinct from a failed query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a space-aligned text table: header line, then one line per row.
    /// Numbers are right-aligned, everything else left-aligned.
    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (idx, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let numeric: Vec<bool> = (0..self.columns.len())
            .map(|idx| {
                !self.rows.is_empty()
                    && self
                        .rows
                        .iter()
                        .all(|row| row.get(idx).is_some_and(|v| v.is_numeric() || *v == Value::Null))
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(
            self.columns
                .iter()
                .enumerate()
                .map(|(idx, name)| pad(name, widths[idx], numeric[idx]))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &cells {
            lines.push(
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        let width = widths.get(idx).copied().unwrap_or(0);
                        let right = numeric.get(idx).copied().unwrap_or(false);
                        pad(cell, width, right)
                    })
                    .collect::<Vec<_>>()
                    .join("  "),
            );
        }
        lines
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

impl fmt::Display for TabularResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "User"),
            TurnRole::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One user question or one assistant response.
///
/// A turn carrying a result always carries the SQL that produced it; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    role: TurnRole,
    content: String,
    generated_sql: Option<String>,
    result: Option<TabularResult>,
}

impl Turn {
    pub fn user(question: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: question.into(),
            generated_sql: None,
            result: None,
        }
    }

    /// Assistant reply that did not execute a query (refusals and early failures)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            generated_sql: None,
            result: None,
        }
    }

    /// Assistant reply for a query that was executed, or attempted, but
    /// produced no answer
    pub fn executed(content: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            generated_sql: Some(sql.into()),
            result: None,
        }
    }

    /// Assistant answer backed by an executed query and its (possibly empty) result
    pub fn answered(content: impl Into<String>, sql: impl Into<String>, result: TabularResult) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            generated_sql: Some(sql.into()),
            result: Some(result),
        }
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn generated_sql(&self) -> Option<&str> {
        self.generated_sql.as_deref()
    }

    pub fn result(&self) -> Option<&TabularResult> {
        self.result.as_ref()
    }
}
