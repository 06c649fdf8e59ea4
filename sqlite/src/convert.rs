//! Conversion between SQLite values and [`SqlValue`].

use roster_core::{Row, SqlValue};
use rusqlite::types::ValueRef;

use crate::error::{Result, StoreError};

/// Converts a borrowed SQLite value into an owned [`SqlValue`].
///
/// Text that is not valid UTF-8 is rejected rather than replaced, so a dump
/// never silently alters stored data.
pub(crate) fn value_from_ref(table: &str, value: ValueRef<'_>) -> Result<SqlValue> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| StoreError::CorruptRow {
                table: table.to_string(),
                reason: format!("text is not valid UTF-8: {e}"),
            })?;
            SqlValue::Text(text.to_string())
        }
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    })
}

/// Reads the first `width` columns of a result row.
pub(crate) fn read_row(table: &str, row: &rusqlite::Row<'_>, width: usize) -> Result<Row> {
    let mut values = Vec::with_capacity(width);
    for idx in 0..width {
        values.push(value_from_ref(table, row.get_ref(idx)?)?);
    }
    Ok(values)
}
