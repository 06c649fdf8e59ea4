//! Catalog and row type definitions.
//!
//! These types describe what the database catalog reports about a table and
//! the values read back from it. They carry no connection state and can be
//! built by hand in tests or by a catalog reader at runtime.

use serde::{Deserialize, Serialize};

/// A single column as reported by the database catalog.
///
/// # Examples
///
/// ```
/// use roster_core::ColumnDescriptor;
///
/// let col = ColumnDescriptor::new(0, "name", "VARCHAR(40)")
///     .with_max_length(40)
///     .not_null();
/// assert_eq!(col.type_label(), "VARCHAR(40)");
/// assert!(!col.nullable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Zero-based ordinal position in the table definition.
    pub ordinal: u32,
    /// Column name exactly as stored in the catalog.
    pub name: String,
    /// Declared type text. May be empty for untyped columns.
    pub declared_type: String,
    /// Maximum length for character types with an explicit bound.
    pub max_length: Option<u32>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Creates a nullable column with no length bound.
    pub fn new(ordinal: u32, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            declared_type: declared_type.into(),
            max_length: None,
            nullable: true,
        }
    }

    /// Sets the maximum character length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Marks the column as `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Returns the declared type, or `ANY` when the column is untyped.
    pub fn type_label(&self) -> &str {
        if self.declared_type.trim().is_empty() {
            "ANY"
        } else {
            &self.declared_type
        }
    }
}

/// A table name together with its ordered columns.
///
/// Columns are kept in catalog ordinal order; a descriptor is a snapshot
/// taken once per dump or inspection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name exactly as stored in the catalog.
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Creates a descriptor, sorting the columns by ordinal position.
    pub fn new(name: impl Into<String>, mut columns: Vec<ColumnDescriptor>) -> Self {
        columns.sort_by_key(|c| c.ordinal);
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the column names in ordinal order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A single value read from a row.
///
/// Dispatching on the runtime kind is enough to render a correct SQL
/// literal; the declared column type is never consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit signed integer. Booleans are stored this way as `0`/`1`.
    Integer(i64),
    /// IEEE-754 double.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Human-readable rendering used by console output.
    ///
    /// Unlike [`to_sql_literal`](crate::to_sql_literal), text is shown
    /// unquoted and blobs are summarized by length.
    pub fn display(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Integer(v) => v.to_string(),
            SqlValue::Real(v) => v.to_string(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Blob(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// A row of values aligned positionally with a [`TableDescriptor`]'s columns.
pub type Row = Vec<SqlValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_descriptor_sorts_columns_by_ordinal() {
        let table = TableDescriptor::new(
            "students",
            vec![
                ColumnDescriptor::new(2, "name", "TEXT"),
                ColumnDescriptor::new(0, "id", "INTEGER"),
                ColumnDescriptor::new(1, "class_id", "INTEGER"),
            ],
        );
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["id", "class_id", "name"]);
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn test_type_label_for_untyped_column() {
        let col = ColumnDescriptor::new(0, "anything", "");
        assert_eq!(col.type_label(), "ANY");
    }

    #[test]
    fn test_display_renders_null_token() {
        assert_eq!(SqlValue::Null.display(), "NULL");
        assert_eq!(SqlValue::from("it's").display(), "it's");
        assert_eq!(SqlValue::Blob(vec![1, 2, 3]).display(), "<3 bytes>");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7_i64)), SqlValue::Integer(7));
    }
}
