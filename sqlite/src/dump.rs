//! Dump engine: catalog-driven `DROP` + `INSERT` scripts.
//!
//! For every table returned by [`Catalog::list_tables`], the engine fetches
//! all rows and writes one block:
//!
//! ```text
//! -- Table: schools
//! DROP TABLE IF EXISTS schools CASCADE;
//! INSERT INTO schools (id, name, password, created_at) VALUES (1, 'test', 'test', '2024-03-01 09:00:00');
//!
//! ```
//!
//! A table with N rows yields exactly one `DROP` and N `INSERT`s, in the
//! order the rows were fetched. Any query failure aborts the whole dump.
//!
//! The engine also has a read-only summary mode ([`DumpEngine::summarize`])
//! reporting columns, row counts and a few sample rows per table.
//!
//! # Example
//!
//! ```no_run
//! use roster_sqlite::{DumpEngine, DumpOptions};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("students.db").unwrap();
//! let report = DumpEngine::new(&conn)
//!     .with_options(DumpOptions { include_schema: false })
//!     .write_to_path("database_dump.sql")
//!     .unwrap();
//! println!("{} tables, {} rows", report.tables.len(), report.total_rows());
//! ```

use std::io::{BufWriter, Write};
use std::path::Path;

use roster_core::{Row, TableDescriptor, render_identifier, to_sql_literal};
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::catalog::{Catalog, select_all_sql};
use crate::convert;
use crate::error::Result;

/// Maximum sample rows reported per table by default.
pub const DEFAULT_SAMPLE_ROWS: usize = 10;

/// Options controlling script output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Emit the stored `CREATE TABLE` statement after each `DROP`.
    pub include_schema: bool,
}

/// Per-table outcome of a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDump {
    /// Table name.
    pub table: String,
    /// Number of `INSERT` statements written.
    pub rows: usize,
}

/// Report of a completed dump.
#[derive(Debug, Clone)]
pub struct DumpReport {
    /// Tables in the order they were written.
    pub tables: Vec<TableDump>,
    /// RFC 3339 timestamp written in the script header.
    pub generated_at: String,
    /// SHA-256 hex digest of the script bytes.
    pub checksum: String,
    /// Size of the script in bytes.
    pub bytes: u64,
}

impl DumpReport {
    /// Total `INSERT` statements across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Structural summary of one table.
#[derive(Debug, Clone)]
pub struct TableSummary {
    /// Catalog snapshot of the table.
    pub table: TableDescriptor,
    /// Total row count.
    pub row_count: u64,
    /// Up to the requested number of rows, in fetch order.
    pub sample: Vec<Row>,
}

/// Produces dump scripts and summaries from a live connection.
pub struct DumpEngine<'a> {
    conn: &'a Connection,
    options: DumpOptions,
}

impl<'a> DumpEngine<'a> {
    /// Creates an engine with default options.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            options: DumpOptions::default(),
        }
    }

    /// Replaces the script options.
    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    /// Writes the full dump script to `out`.
    ///
    /// # Errors
    ///
    /// Any catalog or row query failure, or a write failure, aborts the dump;
    /// whatever was already written to `out` must be discarded.
    pub fn write_script<W: Write>(&self, out: W) -> Result<DumpReport> {
        let catalog = Catalog::new(self.conn);
        let tables = catalog.describe_all()?;
        let generated_at = chrono::Utc::now().to_rfc3339();

        let mut out = HashingWriter::new(BufWriter::new(out));
        writeln!(out, "-- Dump generated at {generated_at}")?;

        let mut written = Vec::with_capacity(tables.len());
        for table in &tables {
            let rows = self.fetch_rows(table, None)?;
            let name = render_identifier(&table.name);

            write!(out, "\n-- Table: {}\n", table.name)?;
            writeln!(out, "DROP TABLE IF EXISTS {name} CASCADE;")?;
            if self.options.include_schema {
                if let Some(ddl) = catalog.create_statement(&table.name)? {
                    writeln!(out, "{};", ddl.trim_end().trim_end_matches(';'))?;
                }
            }

            let columns = table
                .column_names()
                .map(render_identifier)
                .collect::<Vec<_>>()
                .join(", ");
            for row in &rows {
                let values = row.iter().map(to_sql_literal).collect::<Vec<_>>().join(", ");
                writeln!(out, "INSERT INTO {name} ({columns}) VALUES ({values});")?;
            }
            writeln!(out)?;

            debug!(table = %table.name, rows = rows.len(), "Dumped table");
            written.push(TableDump {
                table: table.name.clone(),
                rows: rows.len(),
            });
        }

        let (checksum, bytes) = out.finish()?;
        let report = DumpReport {
            tables: written,
            generated_at,
            checksum,
            bytes,
        };
        info!(
            tables = report.tables.len(),
            rows = report.total_rows(),
            bytes = report.bytes,
            "Dump complete"
        );
        Ok(report)
    }

    /// Writes the dump script to `path`.
    ///
    /// The script is written to a temporary file next to `path` and renamed
    /// into place only after it is complete, so a failed dump leaves any
    /// previous file at `path` untouched.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<DumpReport> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        let report = self.write_script(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), "Dump written");
        Ok(report)
    }

    /// Reports columns, row count and up to `sample_rows` rows per table.
    ///
    /// Nothing is written anywhere.
    pub fn summarize(&self, sample_rows: usize) -> Result<Vec<TableSummary>> {
        let catalog = Catalog::new(self.conn);
        catalog
            .describe_all()?
            .into_iter()
            .map(|table| {
                let row_count = catalog.count_rows(&table)?;
                let sample = if row_count == 0 {
                    Vec::new()
                } else {
                    self.fetch_rows(&table, Some(sample_rows))?
                };
                Ok(TableSummary {
                    table,
                    row_count,
                    sample,
                })
            })
            .collect()
    }

    fn fetch_rows(&self, table: &TableDescriptor, limit: Option<usize>) -> Result<Vec<Row>> {
        let width = table.width();
        let mut rows_out = Vec::new();
        match limit {
            Some(limit) => {
                let sql = format!("{} LIMIT ?1", select_all_sql(table));
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query(params![limit as i64])?;
                while let Some(row) = rows.next()? {
                    rows_out.push(convert::read_row(&table.name, row, width)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&select_all_sql(table))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    rows_out.push(convert::read_row(&table.name, row, width)?);
                }
            }
        }
        Ok(rows_out)
    }
}

/// Writer adapter that hashes and counts everything passing through it.
struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
    bytes: u64,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    /// Flushes the inner writer and returns the hex digest and byte count.
    fn finish(mut self) -> std::io::Result<(String, u64)> {
        self.inner.flush()?;
        Ok((format!("{:x}", self.hasher.finalize()), self.bytes))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(conn: &Connection, options: DumpOptions) -> (String, DumpReport) {
        let mut buf = Vec::new();
        let report = DumpEngine::new(conn)
            .with_options(options)
            .write_script(&mut buf)
            .unwrap();
        (String::from_utf8(buf).unwrap(), report)
    }

    #[test]
    fn test_empty_table_still_gets_drop() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE empty (id INTEGER);").unwrap();
        let (text, report) = script(&conn, DumpOptions::default());
        assert!(text.contains("-- Table: empty\nDROP TABLE IF EXISTS empty CASCADE;\n\n"));
        assert!(!text.contains("INSERT"));
        assert_eq!(report.tables, vec![TableDump { table: "empty".into(), rows: 0 }]);
    }

    #[test]
    fn test_checksum_matches_bytes_written() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('x');")
            .unwrap();
        let (text, report) = script(&conn, DumpOptions::default());
        assert_eq!(report.bytes, text.len() as u64);
        assert_eq!(report.checksum, format!("{:x}", Sha256::digest(text.as_bytes())));
        assert!(text.starts_with(&format!("-- Dump generated at {}", report.generated_at)));
    }

    #[test]
    fn test_include_schema_emits_create_after_drop() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT);").unwrap();
        let (text, _) = script(&conn, DumpOptions { include_schema: true });
        assert!(text.contains("DROP TABLE IF EXISTS t CASCADE;\nCREATE TABLE t (v TEXT);\n"));
    }

    #[test]
    fn test_summary_limits_sample() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE n (i INTEGER);
             WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 25)
             INSERT INTO n SELECT x FROM c;",
        )
        .unwrap();
        let summary = DumpEngine::new(&conn).summarize(DEFAULT_SAMPLE_ROWS).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].row_count, 25);
        assert_eq!(summary[0].sample.len(), 10);
    }
}
