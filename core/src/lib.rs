//! Core types and pure rules for roster database tooling.
//!
//! This crate has no database dependency. It defines:
//!
//! - [`TableDescriptor`] / [`ColumnDescriptor`] — catalog snapshots of a
//!   table and its ordered columns.
//! - [`SqlValue`] and [`to_sql_literal`] — row values and their SQL literal
//!   spelling, with quote doubling for text.
//! - [`MetaCommand`] — classification of console input into shorthand
//!   introspection commands or raw statements.
//! - [`SeedTarget`], [`SectionStatuses`], [`generate_students`] — the
//!   structural rules of the school → class → student fixture.
//! - [`validate_identifier`] / [`render_identifier`] — identifier checks
//!   and quoting.
//!
//! # Example
//!
//! ```
//! use roster_core::*;
//!
//! let table = TableDescriptor::new(
//!     "schools",
//!     vec![
//!         ColumnDescriptor::new(0, "id", "INTEGER"),
//!         ColumnDescriptor::new(1, "name", "TEXT").not_null(),
//!     ],
//! );
//! let row = vec![SqlValue::Integer(1), SqlValue::from("St. Mary's")];
//! let values: Vec<String> = row.iter().map(to_sql_literal).collect();
//! assert_eq!(values, vec!["1", "'St. Mary''s'"]);
//! assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
//! ```

mod command;
mod literal;
mod roster;
mod types;
mod validate;

pub use command::{MetaCommand, TERMINATE_KEYWORDS};
pub use literal::{NULL_LITERAL, parse_string_literal, quote_string, to_sql_literal};
pub use roster::{
    GROUP_SIZE, Gender, GroupLabel, PROBLEM_PROBABILITY, SPECIAL_CLASS_PROBABILITY,
    STUDENTS_PER_SECTION, SectionStatus, SectionStatuses, SeedTarget, StudentDraft,
    generate_students,
};
pub use types::{ColumnDescriptor, Row, SqlValue, TableDescriptor};
pub use validate::{
    MAX_IDENTIFIER_LEN, SQL_KEYWORDS, ValidationError, is_keyword, is_simple_identifier,
    quote_identifier, render_identifier, validate_identifier,
};
