//! Roster schema bootstrap.
//!
//! Creates the three roster tables and their supporting index:
//!
//! - `schools` — unique by name, holds the school's login credential
//! - `classes` — one row per (school, grade), with `section_count` and the
//!   JSON `section_statuses` map
//! - `students` — one row per student, scoped to a class and a section
//!
//! Every statement uses `IF NOT EXISTS`, so bootstrapping an existing
//! database is a no-op.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Roster tables in dependency order.
pub const ROSTER_TABLES: [&str; 3] = ["schools", "classes", "students"];

/// Returns the complete roster schema as one SQL batch.
pub fn generate_schema_sql() -> &'static str {
    r#"
CREATE TABLE IF NOT EXISTS schools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    school_id INTEGER NOT NULL,
    grade INTEGER NOT NULL,
    section_count INTEGER NOT NULL,
    is_distributed INTEGER DEFAULT 0,
    parent_class_id INTEGER,
    section_statuses TEXT DEFAULT '{}',
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (school_id) REFERENCES schools(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    class_id INTEGER NOT NULL,
    section_number INTEGER NOT NULL DEFAULT 1,
    name TEXT NOT NULL,
    gender TEXT NOT NULL CHECK (gender IN ('M', 'F')),
    is_problem_student INTEGER DEFAULT 0,
    is_special_class INTEGER DEFAULT 0,
    is_underachiever INTEGER DEFAULT 0,
    group_name TEXT,
    rank INTEGER,
    previous_section INTEGER,
    birth_date TEXT,
    contact TEXT,
    notes TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (class_id) REFERENCES classes(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_students_class_section ON students(class_id, section_number);
"#
}

/// Creates any missing roster tables and indexes.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(generate_schema_sql())?;
    debug!("Roster schema ensured");
    Ok(())
}
