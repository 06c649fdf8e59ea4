//! SQLite backend for roster database tooling.
//!
//! This crate reads a database's catalog, serializes its contents into a
//! portable `DROP` + `INSERT` script, runs an interactive console with
//! `psql`-style shorthand, and deterministically (re)populates the
//! school → class → student fixture.
//!
//! # Architecture
//!
//! - **`catalog`** — table and column discovery from `sqlite_master` and
//!   `pragma_table_info`
//! - **`dump`** — dump scripts (atomic file output, checksum) and summaries
//! - **`session`** — execution of classified console commands
//! - **`console`** — the read/classify/execute/render loop
//! - **`schema`** — roster table bootstrap
//! - **`seed`** — idempotent seeder and class status read-back
//!
//! Every operation takes an explicit [`rusqlite::Connection`]; nothing in
//! this crate holds a global handle.
//!
//! # Quick start — dump
//!
//! ```no_run
//! use roster_sqlite::{DumpEngine, open};
//!
//! let conn = open("students.db", false).unwrap();
//! let report = DumpEngine::new(&conn).write_to_path("database_dump.sql").unwrap();
//! println!("sha256 {}", report.checksum);
//! ```
//!
//! # Quick start — console
//!
//! ```no_run
//! use roster_sqlite::{Console, ScriptedLines, open};
//!
//! let conn = open("students.db", false).unwrap();
//! let mut input = ScriptedLines::new(["\\dt", "\\d students", "exit"]);
//! Console::new(&conn, std::io::stdout()).run(&mut input).unwrap();
//! ```

mod catalog;
mod console;
mod convert;
mod dump;
mod error;
mod schema;
mod seed;
mod session;

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

pub use catalog::{Catalog, LIST_DATABASES_SQL, declared_max_length};
pub use console::{
    Console, ConsoleSummary, INTERRUPT_HINT, LineEvent, LineSource, PROMPT, ReaderLines,
    ScriptedLines, render_result_set,
};
pub use dump::{DEFAULT_SAMPLE_ROWS, DumpEngine, DumpOptions, DumpReport, TableDump, TableSummary};
pub use error::{ErrorKind, Result, StoreError};
pub use schema::{ROSTER_TABLES, ensure_schema, generate_schema_sql};
pub use seed::{ClassStatus, DEFAULT_SCHOOL_PASSWORD, SeedReport, Seeder, class_status};
pub use session::{DESCRIBE_COLUMNS, QueryOutcome, ResultSet, TABLE_NAME_COLUMN, execute};

/// Opens the database at `path` with foreign keys enforced.
///
/// With `create == false` a missing file is an error instead of being
/// created empty.
///
/// # Errors
///
/// Returns [`StoreError::Connection`] if the file cannot be opened.
pub fn open(path: impl AsRef<Path>, create: bool) -> Result<Connection> {
    let path = path.as_ref();
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if create {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let conn = Connection::open_with_flags(path, flags).map_err(|source| StoreError::Connection {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    debug!(path = %path.display(), create, "Database opened");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_without_create_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(dir.path().join("missing.db"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_open_with_create_enables_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(dir.path().join("new.db"), true).unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }
}
