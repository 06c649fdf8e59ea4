//! SQL literal rendering.
//!
//! Converts a [`SqlValue`] into the text that would reproduce it inside an
//! `INSERT` statement:
//!
//! - `NULL` is emitted bare, never quoted
//! - text is wrapped in single quotes with every embedded `'` doubled
//! - integers and reals are emitted as plain numerals
//! - blobs use the `X'..'` hex form
//!
//! # Examples
//!
//! ```
//! use roster_core::{SqlValue, parse_string_literal, to_sql_literal};
//!
//! let lit = to_sql_literal(&SqlValue::from("O'Brien"));
//! assert_eq!(lit, "'O''Brien'");
//! assert_eq!(parse_string_literal(&lit).as_deref(), Some("O'Brien"));
//!
//! assert_eq!(to_sql_literal(&SqlValue::Null), "NULL");
//! assert_eq!(to_sql_literal(&SqlValue::from("")), "''");
//! ```

use crate::SqlValue;

/// The bare token emitted for NULL values.
pub const NULL_LITERAL: &str = "NULL";

/// Renders a value as a SQL literal.
pub fn to_sql_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => NULL_LITERAL.to_string(),
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Real(v) => real_literal(*v),
        SqlValue::Text(s) => quote_string(s),
        SqlValue::Blob(bytes) => blob_literal(bytes),
    }
}

/// Wraps `value` in single quotes, doubling every embedded quote.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Parses a single-quoted SQL string literal back into its value.
///
/// Returns `None` if `literal` is not exactly one quoted string, for
/// example when an inner quote is not doubled.
pub fn parse_string_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        // A quote inside the literal must be the first half of a `''` pair.
        if ch == '\'' && chars.next() != Some('\'') {
            return None;
        }
        out.push(ch);
    }
    Some(out)
}

fn real_literal(value: f64) -> String {
    if value.is_nan() {
        // SQLite stores NaN as NULL, so there is no other faithful spelling.
        return NULL_LITERAL.to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "9e999".to_string()
        } else {
            "-9e999".to_string()
        };
    }
    format!("{value:?}")
}

fn blob_literal(bytes: &[u8]) -> String {
    let hex = bytes.iter().map(|b| format!("{b:02X}")).collect::<String>();
    format!("X'{hex}'")
}
