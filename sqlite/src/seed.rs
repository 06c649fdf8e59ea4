//! Idempotent school → class → student seeder.
//!
//! A seeding run, executed inside a single transaction:
//!
//! 1. bootstrap the roster schema if it is missing;
//! 2. look up the school by name, creating it with a placeholder credential
//!    if absent (an existing school is never modified);
//! 3. look up the class by (school, grade), creating it with every section
//!    `in_progress`, or patching only its `section_count` if that differs;
//! 4. delete every student of the class;
//! 5. insert `section_count × 15` freshly generated students;
//! 6. mark every section `completed`.
//!
//! Any failure drops the transaction, which rolls everything back, so the
//! caller never observes a partially regenerated class.
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use roster_core::SeedTarget;
//! use roster_sqlite::Seeder;
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("students.db").unwrap();
//! let report = Seeder::new(&mut conn, StdRng::seed_from_u64(7))
//!     .seed(&SeedTarget::new("test", 2, 3))
//!     .unwrap();
//! assert_eq!(report.students_inserted, 45);
//! ```

use rand::Rng;
use roster_core::{SectionStatus, SectionStatuses, SeedTarget, generate_students};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::schema::ensure_schema;

/// Credential stored for schools the seeder creates.
pub const DEFAULT_SCHOOL_PASSWORD: &str = "test";

const FIND_SCHOOL_SQL: &str = "SELECT id FROM schools WHERE name = ?1";

const FIND_CLASS_SQL: &str = "SELECT id, section_count, section_statuses FROM classes \
     WHERE school_id = ?1 AND grade = ?2 ORDER BY id LIMIT 1";

const INSERT_STUDENT_SQL: &str = "INSERT INTO students \
     (class_id, section_number, name, gender, is_problem_student, is_special_class, \
      is_underachiever, group_name, rank) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Outcome of one seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub school_id: i64,
    /// `true` if the school row was created by this run.
    pub school_created: bool,
    pub class_id: i64,
    /// `true` if the class row was created by this run.
    pub class_created: bool,
    /// Previous `section_count`, if this run changed it.
    pub section_count_patched: Option<u32>,
    /// Students removed before regeneration.
    pub students_deleted: usize,
    pub students_inserted: usize,
    /// Students carrying `group1` or `group2`.
    pub grouped_students: usize,
}

/// Read-back view of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassStatus {
    pub school_id: i64,
    pub class_id: i64,
    pub grade: u32,
    pub section_count: u32,
    /// Typed view of the stored `section_statuses` column.
    pub statuses: SectionStatuses,
    /// `(section_number, student count)` for every section that has students.
    pub students_per_section: Vec<(u32, u64)>,
}

impl ClassStatus {
    /// Total students across all sections.
    pub fn student_count(&self) -> u64 {
        self.students_per_section.iter().map(|(_, n)| n).sum()
    }
}

/// Seeds one class of one school.
pub struct Seeder<'a, R: Rng> {
    conn: &'a mut Connection,
    rng: R,
    school_password: String,
}

impl<'a, R: Rng> Seeder<'a, R> {
    /// Creates a seeder that draws names and flags from `rng`.
    pub fn new(conn: &'a mut Connection, rng: R) -> Self {
        Self {
            conn,
            rng,
            school_password: DEFAULT_SCHOOL_PASSWORD.to_string(),
        }
    }

    /// Sets the credential stored when a school has to be created.
    pub fn with_school_password(mut self, password: impl Into<String>) -> Self {
        self.school_password = password.into();
        self
    }

    /// Runs the full seeding sequence for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSeedTarget`] before touching the database
    /// if the target is invalid. Any later failure rolls back the whole run.
    pub fn seed(&mut self, target: &SeedTarget) -> Result<SeedReport> {
        target.validate().map_err(StoreError::InvalidSeedTarget)?;

        let tx = self.conn.transaction()?;
        ensure_schema(&tx)?;

        let (school_id, school_created) = ensure_school(&tx, &target.school, &self.school_password)?;
        let (class_id, class_created, section_count_patched) = ensure_class(&tx, school_id, target)?;

        let students_deleted = tx.execute(
            "DELETE FROM students WHERE class_id = ?1",
            params![class_id],
        )?;
        debug!(class_id, students_deleted, "Cleared existing students");

        let drafts = generate_students(&mut self.rng, target.section_count);
        let mut grouped_students = 0;
        {
            let mut stmt = tx.prepare(INSERT_STUDENT_SQL)?;
            for student in &drafts {
                stmt.execute(params![
                    class_id,
                    student.section,
                    student.name,
                    student.gender.code(),
                    student.is_problem,
                    student.is_special_class,
                    student.is_underachiever,
                    student.group.as_str(),
                    student.rank,
                ])?;
                if student.group.is_grouped() {
                    grouped_students += 1;
                }
            }
        }

        let completed = SectionStatuses::uniform(target.section_count, SectionStatus::Completed);
        tx.execute(
            "UPDATE classes SET section_statuses = ?1 WHERE id = ?2",
            params![completed.to_json()?, class_id],
        )?;

        tx.commit()?;

        let report = SeedReport {
            school_id,
            school_created,
            class_id,
            class_created,
            section_count_patched,
            students_deleted,
            students_inserted: drafts.len(),
            grouped_students,
        };
        info!(
            school = %target.school,
            grade = target.grade,
            inserted = report.students_inserted,
            grouped = report.grouped_students,
            "Seeding complete"
        );
        Ok(report)
    }
}

fn ensure_school(conn: &Connection, name: &str, password: &str) -> Result<(i64, bool)> {
    let existing = conn
        .query_row(FIND_SCHOOL_SQL, params![name], |row| row.get::<_, i64>(0))
        .optional()?;
    if let Some(id) = existing {
        debug!(school_id = id, "Using existing school");
        return Ok((id, false));
    }

    conn.execute(
        "INSERT INTO schools (name, password) VALUES (?1, ?2)",
        params![name, password],
    )?;
    let id = conn.last_insert_rowid();
    info!(school_id = id, name, "School created");
    Ok((id, true))
}

fn ensure_class(
    conn: &Connection,
    school_id: i64,
    target: &SeedTarget,
) -> Result<(i64, bool, Option<u32>)> {
    let existing = conn
        .query_row(FIND_CLASS_SQL, params![school_id, target.grade], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?))
        })
        .optional()?;

    match existing {
        Some((id, stored)) if stored == target.section_count => {
            debug!(class_id = id, "Using existing class");
            Ok((id, false, None))
        }
        Some((id, stored)) => {
            conn.execute(
                "UPDATE classes SET section_count = ?1 WHERE id = ?2",
                params![target.section_count, id],
            )?;
            info!(
                class_id = id,
                from = stored,
                to = target.section_count,
                "Class section count patched"
            );
            Ok((id, false, Some(stored)))
        }
        None => {
            let statuses =
                SectionStatuses::uniform(target.section_count, SectionStatus::InProgress);
            conn.execute(
                "INSERT INTO classes (school_id, grade, section_count, section_statuses) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![school_id, target.grade, target.section_count, statuses.to_json()?],
            )?;
            let id = conn.last_insert_rowid();
            info!(class_id = id, grade = target.grade, "Class created");
            Ok((id, true, None))
        }
    }
}

/// Reads back the class for (`school`, `grade`), if both exist.
///
/// # Errors
///
/// Returns [`StoreError::StatusEncoding`] if the stored status map is not
/// valid JSON of the expected shape.
pub fn class_status(conn: &Connection, school: &str, grade: u32) -> Result<Option<ClassStatus>> {
    let Some(school_id) = conn
        .query_row(FIND_SCHOOL_SQL, params![school], |row| row.get::<_, i64>(0))
        .optional()?
    else {
        return Ok(None);
    };

    let Some((class_id, section_count, raw)) = conn
        .query_row(FIND_CLASS_SQL, params![school_id, grade], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .optional()?
    else {
        return Ok(None);
    };

    let statuses = SectionStatuses::from_json(raw.as_deref().unwrap_or_default())?;

    let mut stmt = conn.prepare(
        "SELECT section_number, COUNT(*) FROM students WHERE class_id = ?1 \
         GROUP BY section_number ORDER BY section_number",
    )?;
    let students_per_section = stmt
        .query_map(params![class_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Some(ClassStatus {
        school_id,
        class_id,
        grade,
        section_count,
        statuses,
        students_per_section,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seed(conn: &mut Connection, target: &SeedTarget) -> SeedReport {
        Seeder::new(conn, StdRng::seed_from_u64(1)).seed(target).unwrap()
    }

    #[test]
    fn test_first_run_creates_school_and_class() {
        let mut conn = Connection::open_in_memory().unwrap();
        let report = seed(&mut conn, &SeedTarget::new("test", 2, 3));
        assert!(report.school_created);
        assert!(report.class_created);
        assert_eq!(report.section_count_patched, None);
        assert_eq!(report.students_deleted, 0);
        assert_eq!(report.students_inserted, 45);
        assert_eq!(report.grouped_students, 18);
    }

    #[test]
    fn test_second_run_reuses_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        let first = seed(&mut conn, &SeedTarget::new("test", 2, 3));
        let second = seed(&mut conn, &SeedTarget::new("test", 2, 3));
        assert_eq!(first.school_id, second.school_id);
        assert_eq!(first.class_id, second.class_id);
        assert!(!second.school_created);
        assert!(!second.class_created);
        assert_eq!(second.students_deleted, 45);
    }

    #[test]
    fn test_invalid_target_touches_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = Seeder::new(&mut conn, StdRng::seed_from_u64(1))
            .seed(&SeedTarget::new("", 2, 3))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSeedTarget(_)));
        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_class_status_reads_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        seed(&mut conn, &SeedTarget::new("test", 2, 2));
        let status = class_status(&conn, "test", 2).unwrap().unwrap();
        assert_eq!(status.section_count, 2);
        assert!(status.statuses.covers_exactly(2));
        assert!(status.statuses.all(SectionStatus::Completed));
        assert_eq!(status.students_per_section, vec![(1, 15), (2, 15)]);
        assert_eq!(status.student_count(), 30);

        assert_eq!(class_status(&conn, "test", 3).unwrap(), None);
        assert_eq!(class_status(&conn, "other", 2).unwrap(), None);
    }

    #[test]
    fn test_class_status_rejects_bad_json() {
        let mut conn = Connection::open_in_memory().unwrap();
        let report = seed(&mut conn, &SeedTarget::new("test", 2, 1));
        conn.execute(
            "UPDATE classes SET section_statuses = 'not json' WHERE id = ?1",
            params![report.class_id],
        )
        .unwrap();
        let err = class_status(&conn, "test", 2).unwrap_err();
        assert!(matches!(err, StoreError::StatusEncoding(_)));
    }
}
