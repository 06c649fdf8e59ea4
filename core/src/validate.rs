//! Identifier and seed-target validation.
//!
//! Identifiers that reach statement text must either come from the catalog
//! or pass [`validate_identifier`]. Rendering goes through
//! [`render_identifier`], which leaves simple non-keyword names bare and
//! double-quotes everything else. Generated queries use [`quote_identifier`]
//! unconditionally.
//!
//! # Examples
//!
//! ```
//! use roster_core::{render_identifier, validate_identifier};
//!
//! assert!(validate_identifier("students").is_ok());
//! assert!(validate_identifier("").is_err());
//!
//! assert_eq!(render_identifier("students"), "students");
//! assert_eq!(render_identifier("class list"), "\"class list\"");
//! assert_eq!(render_identifier("order"), "\"order\"");
//! ```

use thiserror::Error;

/// Longest identifier accepted from user input.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// SQLite keywords, plus the reserved words of common SQL dialects that a
/// replayed script may meet.
pub const SQL_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYSE", "ANALYZE", "AND",
    "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC", "ATTACH", "AUTHORIZATION", "AUTOINCREMENT",
    "BEFORE", "BEGIN", "BETWEEN", "BOTH", "BY", "CASCADE", "CASE", "CAST", "CHECK", "COLLATE",
    "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT",
    "CURRENT_CATALOG", "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DATABASE", "DEFAULT", "DEFERRABLE", "DEFERRED",
    "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH", "ELSE", "END", "ESCAPE",
    "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FALSE", "FETCH", "FILTER",
    "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB", "GRANT",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "ILIKE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP",
    "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT", "NOTHING", "NOTNULL", "NULL", "NULLS", "OF",
    "OFFSET", "ON", "ONLY", "OR", "ORDER", "OTHERS", "OUTER", "OVER", "OVERLAPS", "PARTITION",
    "PLACING", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE", "RANGE", "RECURSIVE",
    "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "RETURNING",
    "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SESSION_USER", "SET", "SIMILAR",
    "SOME", "SYMMETRIC", "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRAILING",
    "TRANSACTION", "TRIGGER", "TRUE", "UNBOUNDED", "UNION", "UNIQUE", "UPDATE", "USER", "USING",
    "VACUUM", "VALUES", "VARIADIC", "VERBOSE", "VIEW", "VIRTUAL", "WHEN", "WHERE", "WINDOW",
    "WITH", "WITHOUT",
];

/// Validation errors for identifiers and seeding targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is empty or whitespace-only.
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    /// Identifier exceeds [`MAX_IDENTIFIER_LEN`].
    #[error("identifier too long ({0} characters)")]
    IdentifierTooLong(usize),
    /// Identifier contains a control character.
    #[error("identifier contains a control character: {0:?}")]
    ControlCharacter(String),
    /// School name is empty or whitespace-only.
    #[error("school name cannot be empty")]
    EmptySchoolName,
    /// Grade must be at least 1.
    #[error("grade must be at least 1")]
    InvalidGrade,
    /// Section count must be at least 1.
    #[error("section count must be at least 1")]
    InvalidSectionCount,
}

/// Checks that `name` is usable as a table or column identifier.
///
/// This does not check existence; callers resolve names against the catalog
/// before using them in follow-up queries.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    let len = name.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::IdentifierTooLong(len));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter(name.to_string()));
    }
    Ok(())
}

/// Returns `true` for names matching `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns `true` if `name` is an SQL keyword, ignoring ASCII case.
pub fn is_keyword(name: &str) -> bool {
    SQL_KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(name))
}

/// Double-quotes `name`, doubling every embedded `"`.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders an identifier for script text: bare when simple and not a
/// keyword, quoted otherwise.
pub fn render_identifier(name: &str) -> String {
    if is_simple_identifier(name) && !is_keyword(name) {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}
