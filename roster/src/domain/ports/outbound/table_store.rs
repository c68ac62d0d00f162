use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::StoreError;

/// Tables the roster reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tasks,
    Standby,
    Programmers,
}

impl Table {
    /// Table name in the store.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tasks => "pekerjaan",
            Self::Standby => "standby",
            Self::Programmers => "programmer",
        }
    }

    /// Column that identifies a row.
    pub fn key_column(self) -> &'static str {
        match self {
            Self::Tasks | Self::Standby => "id",
            Self::Programmers => "npm",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive substring search across several columns; matches when any column does.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub text: String,
    pub columns: Vec<&'static str>,
}

/// A read against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// Exact-match filter on a single column.
    pub filter: Option<(&'static str, Value)>,
    pub search: Option<TextSearch>,
    /// Ascending order column. Store order otherwise.
    pub order_by: Option<&'static str>,
}

impl SelectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter = Some((column, value.into()));
        self
    }

    /// Blank text means no search.
    pub fn search(mut self, text: &str, columns: &[&'static str]) -> Self {
        let text = text.trim();
        self.search = (!text.is_empty()).then(|| TextSearch {
            text: text.to_string(),
            columns: columns.to_vec(),
        });
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }
}

/// Identifies a single row by its key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub column: &'static str,
    pub value: i64,
}

impl RowKey {
    pub fn of(table: Table, value: i64) -> Self {
        Self {
            column: table.key_column(),
            value,
        }
    }
}

/// Outbound port for the hosted table store.
///
/// Rows travel as JSON objects using the store's column names. Decoding into
/// domain types happens in the services.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, StoreError>;

    /// Inserts one row. Returns the stored rows when the store echoes them.
    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, StoreError>;

    /// Applies `patch` to the rows matching `key`.
    async fn update(&self, table: Table, key: RowKey, patch: Value)
        -> Result<Vec<Value>, StoreError>;

    async fn delete(&self, table: Table, key: RowKey) -> Result<(), StoreError>;
}
