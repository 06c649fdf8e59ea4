//! Execution of classified console commands.
//!
//! [`execute`] turns a [`MetaCommand`] into a [`QueryOutcome`]: shorthand
//! commands are answered from the [`Catalog`], raw text is prepared and run
//! as-is. Rendering is left to the caller.

use roster_core::{MetaCommand, SqlValue};
use rusqlite::Connection;
use tracing::debug;

use crate::catalog::{Catalog, LIST_DATABASES_SQL};
use crate::convert;
use crate::error::Result;

/// Column header of the `\dt` result set.
pub const TABLE_NAME_COLUMN: &str = "table_name";

/// Column headers of the `\d <table>` result set.
pub const DESCRIBE_COLUMNS: [&str; 4] = [
    "column_name",
    "data_type",
    "character_maximum_length",
    "is_nullable",
];

/// A result set: headers plus rows aligned to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the result set has headers but no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What executing one command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The statement produced a result set, possibly with zero rows.
    Rows(ResultSet),
    /// The statement ran without a result set.
    Executed { changes: usize },
    /// Nothing was executed (blank input or a terminate keyword).
    Idle,
}

/// Executes one classified command against `conn`.
///
/// # Errors
///
/// Catalog and statement failures are returned as-is; the console reports
/// them and keeps going.
pub fn execute(conn: &Connection, command: &MetaCommand) -> Result<QueryOutcome> {
    match command {
        MetaCommand::Empty | MetaCommand::Terminate => Ok(QueryOutcome::Idle),
        MetaCommand::ListTables => {
            let rows = Catalog::new(conn)
                .list_tables()?
                .into_iter()
                .map(|name| vec![SqlValue::Text(name)])
                .collect();
            Ok(QueryOutcome::Rows(ResultSet {
                columns: vec![TABLE_NAME_COLUMN.to_string()],
                rows,
            }))
        }
        MetaCommand::ListDatabases => run_statement(conn, LIST_DATABASES_SQL),
        MetaCommand::DescribeTable(table) => {
            let table = Catalog::new(conn).resolve_table(table)?;
            let rows = table
                .columns
                .iter()
                .map(|col| {
                    vec![
                        SqlValue::Text(col.name.clone()),
                        SqlValue::Text(col.type_label().to_string()),
                        col.max_length.map(i64::from).into(),
                        SqlValue::from(if col.nullable { "YES" } else { "NO" }),
                    ]
                })
                .collect();
            Ok(QueryOutcome::Rows(ResultSet {
                columns: DESCRIBE_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows,
            }))
        }
        MetaCommand::Raw(sql) => run_statement(conn, sql),
    }
}

fn run_statement(conn: &Connection, sql: &str) -> Result<QueryOutcome> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    if width == 0 {
        let changes = stmt.execute([])?;
        debug!(changes, "Statement executed");
        return Ok(QueryOutcome::Executed { changes });
    }

    let columns = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut rows_out = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        rows_out.push(convert::read_row("query", row, width)?);
    }
    debug!(rows = rows_out.len(), "Query returned rows");
    Ok(QueryOutcome::Rows(ResultSet {
        columns,
        rows: rows_out,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE pets (id INTEGER PRIMARY KEY, name VARCHAR(30) NOT NULL, owner TEXT);
             INSERT INTO pets (name, owner) VALUES ('Rex', NULL);",
        )
        .unwrap();
        conn
    }

    fn rows(outcome: QueryOutcome) -> ResultSet {
        match outcome {
            QueryOutcome::Rows(set) => set,
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn test_list_tables_single_column() {
        let conn = setup();
        let set = rows(execute(&conn, &MetaCommand::ListTables).unwrap());
        assert_eq!(set.columns, vec!["table_name"]);
        assert_eq!(set.rows, vec![vec![SqlValue::from("pets")]]);
    }

    #[test]
    fn test_describe_table_rows() {
        let conn = setup();
        let set = rows(execute(&conn, &MetaCommand::DescribeTable("pets".into())).unwrap());
        assert_eq!(set.columns, DESCRIBE_COLUMNS.to_vec());
        assert_eq!(
            set.rows[1],
            vec![
                SqlValue::from("name"),
                SqlValue::from("VARCHAR(30)"),
                SqlValue::Integer(30),
                SqlValue::from("NO"),
            ]
        );
        assert_eq!(set.rows[2][2], SqlValue::Null);
        assert_eq!(set.rows[2][3], SqlValue::from("YES"));
    }

    #[test]
    fn test_describe_unknown_table_fails() {
        let conn = setup();
        let err = execute(&conn, &MetaCommand::DescribeTable("ghosts".into())).unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }

    #[test]
    fn test_list_databases_includes_main() {
        let conn = setup();
        let set = rows(execute(&conn, &MetaCommand::ListDatabases).unwrap());
        assert_eq!(set.columns, vec!["name", "file"]);
        assert_eq!(set.rows[0][0], SqlValue::from("main"));
    }

    #[test]
    fn test_raw_query_and_statement() {
        let conn = setup();
        let set = rows(execute(&conn, &MetaCommand::Raw("SELECT name, owner FROM pets".into())).unwrap());
        assert_eq!(set.columns, vec!["name", "owner"]);
        assert_eq!(set.rows, vec![vec![SqlValue::from("Rex"), SqlValue::Null]]);

        let outcome = execute(
            &conn,
            &MetaCommand::Raw("INSERT INTO pets (name) VALUES ('Tom'), ('Kit')".into()),
        )
        .unwrap();
        assert_eq!(outcome, QueryOutcome::Executed { changes: 2 });
    }

    #[test]
    fn test_empty_result_keeps_headers() {
        let conn = setup();
        let set = rows(execute(&conn, &MetaCommand::Raw("SELECT id FROM pets WHERE id < 0".into())).unwrap());
        assert_eq!(set.columns, vec!["id"]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_idle_commands() {
        let conn = setup();
        assert_eq!(execute(&conn, &MetaCommand::Empty).unwrap(), QueryOutcome::Idle);
        assert_eq!(execute(&conn, &MetaCommand::Terminate).unwrap(), QueryOutcome::Idle);
    }

    #[test]
    fn test_bad_sql_is_query_error() {
        let conn = setup();
        let err = execute(&conn, &MetaCommand::Raw("SELEC 1".into())).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Query);
    }
}
