//! Catalog reader over SQLite's schema tables.
//!
//! Tables are read from `sqlite_master`, skipping SQLite's own `sqlite_*`
//! tables. Columns come from the `pragma_table_info` table-valued function,
//! which takes the table name as a bound parameter, so no user text is ever
//! spliced into catalog queries.
//!
//! # Example
//!
//! ```no_run
//! use roster_sqlite::Catalog;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("students.db").unwrap();
//! let catalog = Catalog::new(&conn);
//! for table in catalog.list_tables().unwrap() {
//!     let columns = catalog.describe_table(&table).unwrap();
//!     println!("{table}: {} columns", columns.len());
//! }
//! ```

use std::sync::LazyLock;

use regex::Regex;
use roster_core::{ColumnDescriptor, TableDescriptor, quote_identifier, validate_identifier};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{Result, StoreError};

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY name";

const DESCRIBE_TABLE_SQL: &str =
    "SELECT cid, name, type, \"notnull\" FROM pragma_table_info(?1) ORDER BY cid";

const CREATE_STATEMENT_SQL: &str =
    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1";

/// Query used for the `\l` console shorthand.
pub const LIST_DATABASES_SQL: &str = "SELECT name, file FROM pragma_database_list ORDER BY seq";

static CHAR_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:national\s+)?n?(?:var)?char(?:acter)?(?:\s+varying)?\s*\(\s*(\d+)\s*\)")
        .expect("static regex must compile")
});

/// Extracts `N` from a declared character type such as `VARCHAR(N)`.
///
/// Returns `None` for non-character types and unbounded declarations.
pub fn declared_max_length(declared_type: &str) -> Option<u32> {
    CHAR_LENGTH
        .captures(declared_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Read-only access to the database catalog.
pub struct Catalog<'a> {
    conn: &'a Connection,
}

impl<'a> Catalog<'a> {
    /// Creates a catalog reader over `conn`.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns user-visible table names in alphabetical order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(LIST_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = names.len(), "Listed tables");
        Ok(names)
    }

    /// Returns the columns of `table` in ordinal order.
    ///
    /// An unknown table yields an empty list; use
    /// [`resolve_table`](Self::resolve_table) when absence is an error.
    pub fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut stmt = self.conn.prepare(DESCRIBE_TABLE_SQL)?;
        let columns = stmt
            .query_map(params![table], |row| {
                let ordinal: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let declared_type: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
                let not_null: i64 = row.get(3)?;
                Ok(ColumnDescriptor {
                    ordinal: ordinal as u32,
                    max_length: declared_max_length(&declared_type),
                    name,
                    declared_type,
                    nullable: not_null == 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Looks up `table` in the catalog and returns its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] if the name is malformed and
    /// [`StoreError::TableNotFound`] if no user-visible table has that name.
    pub fn resolve_table(&self, table: &str) -> Result<TableDescriptor> {
        validate_identifier(table).map_err(StoreError::InvalidIdentifier)?;
        if !self.list_tables()?.iter().any(|t| t == table) {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        Ok(TableDescriptor::new(table, self.describe_table(table)?))
    }

    /// Resolves every user-visible table, in [`list_tables`](Self::list_tables) order.
    pub fn describe_all(&self) -> Result<Vec<TableDescriptor>> {
        self.list_tables()?
            .into_iter()
            .map(|name| {
                let columns = self.describe_table(&name)?;
                Ok(TableDescriptor::new(name, columns))
            })
            .collect()
    }

    /// Counts the rows of a table previously obtained from this catalog.
    pub fn count_rows(&self, table: &TableDescriptor) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&table.name));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Returns the `CREATE TABLE` statement SQLite stored for `table`.
    pub fn create_statement(&self, table: &str) -> Result<Option<String>> {
        let sql = self
            .conn
            .query_row(CREATE_STATEMENT_SQL, params![table], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;
        Ok(sql.flatten())
    }
}

/// Builds `SELECT <columns> FROM <table>` for a catalog descriptor, every
/// identifier quoted.
pub(crate) fn select_all_sql(table: &TableDescriptor) -> String {
    let columns = if table.columns.is_empty() {
        "*".to_string()
    } else {
        table
            .column_names()
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("SELECT {columns} FROM {}", quote_identifier(&table.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE zebra (id INTEGER PRIMARY KEY, label VARCHAR(20) NOT NULL);
            CREATE TABLE alpha (b TEXT, a INTEGER, "odd name" NCHAR(4));
            CREATE TABLE withauto (id INTEGER PRIMARY KEY AUTOINCREMENT, v);
            CREATE VIEW v_alpha AS SELECT * FROM alpha;
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_list_tables_sorted_and_hides_internal() {
        let conn = setup();
        let tables = Catalog::new(&conn).list_tables().unwrap();
        // sqlite_sequence exists because of AUTOINCREMENT; views are excluded.
        assert_eq!(tables, vec!["alpha", "withauto", "zebra"]);
    }

    #[test]
    fn test_describe_table_preserves_declaration_order() {
        let conn = setup();
        let cols = Catalog::new(&conn).describe_table("alpha").unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "odd name"]);
        let ordinals: Vec<u32> = cols.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(cols[2].max_length, Some(4));
    }

    #[test]
    fn test_describe_table_types_and_nullability() {
        let conn = setup();
        let cols = Catalog::new(&conn).describe_table("zebra").unwrap();
        assert_eq!(cols[1].declared_type, "VARCHAR(20)");
        assert_eq!(cols[1].max_length, Some(20));
        assert!(!cols[1].nullable);

        let untyped = Catalog::new(&conn).describe_table("withauto").unwrap();
        assert_eq!(untyped[1].declared_type, "");
        assert_eq!(untyped[1].type_label(), "ANY");
    }

    #[test]
    fn test_describe_unknown_table_is_empty() {
        let conn = setup();
        assert!(Catalog::new(&conn).describe_table("missing").unwrap().is_empty());
    }

    #[test]
    fn test_describe_does_not_interpolate_names() {
        let conn = setup();
        let cols = Catalog::new(&conn)
            .describe_table("alpha'); DROP TABLE zebra; --")
            .unwrap();
        assert!(cols.is_empty());
        assert!(Catalog::new(&conn).list_tables().unwrap().contains(&"zebra".to_string()));
    }

    #[test]
    fn test_resolve_table() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        assert_eq!(catalog.resolve_table("zebra").unwrap().width(), 2);
        assert!(matches!(
            catalog.resolve_table("v_alpha"),
            Err(StoreError::TableNotFound(_))
        ));
        assert!(matches!(
            catalog.resolve_table(""),
            Err(StoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_declared_max_length() {
        assert_eq!(declared_max_length("VARCHAR(255)"), Some(255));
        assert_eq!(declared_max_length("character varying (12)"), Some(12));
        assert_eq!(declared_max_length("NVARCHAR(8)"), Some(8));
        assert_eq!(declared_max_length("CHAR(1)"), Some(1));
        assert_eq!(declared_max_length("TEXT"), None);
        assert_eq!(declared_max_length("NUMERIC(10,2)"), None);
        assert_eq!(declared_max_length("INTEGER"), None);
    }

    #[test]
    fn test_count_rows_and_create_statement() {
        let conn = setup();
        conn.execute("INSERT INTO zebra (label) VALUES ('a'), ('b')", [])
            .unwrap();
        let catalog = Catalog::new(&conn);
        let zebra = catalog.resolve_table("zebra").unwrap();
        assert_eq!(catalog.count_rows(&zebra).unwrap(), 2);
        let ddl = catalog.create_statement("zebra").unwrap().unwrap();
        assert!(ddl.starts_with("CREATE TABLE zebra"));
        assert_eq!(catalog.create_statement("missing").unwrap(), None);
    }

    #[test]
    fn test_select_all_sql_quotes_every_name() {
        let conn = setup();
        let alpha = Catalog::new(&conn).resolve_table("alpha").unwrap();
        assert_eq!(
            select_all_sql(&alpha),
            "SELECT \"b\", \"a\", \"odd name\" FROM \"alpha\""
        );
    }

    #[test]
    fn test_keyword_named_table_is_queryable() {
        let conn = setup();
        conn.execute_batch(
            r#"CREATE TABLE "order" ("group" TEXT, "select" INTEGER);
            INSERT INTO "order" VALUES ('a', 1), ('b', 2);"#,
        )
        .unwrap();
        let catalog = Catalog::new(&conn);
        let order = catalog.resolve_table("order").unwrap();
        assert_eq!(catalog.count_rows(&order).unwrap(), 2);
        let mut stmt = conn.prepare(&select_all_sql(&order)).unwrap();
        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(rows, vec![1, 2]);
    }
}
