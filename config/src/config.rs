//! Roster configuration file model.
//!
//! # Example YAML
//!
//! ```yaml
//! database: students.db
//! dump:
//!   output: database_dump.sql
//!   include_schema: false
//! inspect:
//!   sample_rows: 10
//! seed:
//!   school: test
//!   school_password: test
//!   grade: 2
//!   section_count: 3
//!   rng_seed: 42
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use roster_core::SeedTarget;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Settings for `dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Destination of the dump script.
    pub output: PathBuf,
    /// Emit each table's stored `CREATE TABLE` statement after its `DROP`.
    pub include_schema: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("database_dump.sql"),
            include_schema: false,
        }
    }
}

/// Settings for `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Maximum sample rows printed per table.
    pub sample_rows: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self { sample_rows: 10 }
    }
}

/// Default seeding target and generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// School name looked up (or created).
    pub school: String,
    /// Placeholder credential stored when the school is created.
    pub school_password: String,
    /// Grade of the seeded class.
    pub grade: u32,
    /// Desired number of sections.
    pub section_count: u32,
    /// Fixed RNG seed for reproducible names and flags.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            school: "test".to_string(),
            school_password: "test".to_string(),
            grade: 2,
            section_count: 3,
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// The seeding target described by this configuration.
    pub fn target(&self) -> SeedTarget {
        SeedTarget::new(self.school.clone(), self.grade, self.section_count)
    }
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use roster_config::RosterConfig;
///
/// let config: RosterConfig = serde_yaml::from_str("seed: { grade: 5 }").unwrap();
/// assert_eq!(config.seed.grade, 5);
/// assert_eq!(config.seed.section_count, 3);
/// assert_eq!(config.inspect.sample_rows, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Path of the SQLite database file.
    pub database: PathBuf,
    pub dump: DumpConfig,
    pub inspect: InspectConfig,
    pub seed: SeedConfig,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("students.db"),
            dump: DumpConfig::default(),
            inspect: InspectConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl RosterConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read,
    /// [`ConfigError::YamlError`] if parsing fails, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        // An empty document deserializes to `None` rather than a default struct.
        let config: Option<Self> = serde_yaml::from_reader(reader)?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database path cannot be empty".into()));
        }
        if self.inspect.sample_rows == 0 {
            return Err(ConfigError::Invalid(
                "inspect.sample_rows must be at least 1".into(),
            ));
        }
        self.seed
            .target()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("seed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
database: /var/lib/roster/students.db
dump:
  output: out/dump.sql
  include_schema: true
inspect:
  sample_rows: 5
seed:
  school: Hanbit
  school_password: changeme
  grade: 4
  section_count: 6
  rng_seed: 99
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: RosterConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.database, PathBuf::from("/var/lib/roster/students.db"));
        assert_eq!(config.dump.output, PathBuf::from("out/dump.sql"));
        assert!(config.dump.include_schema);
        assert_eq!(config.inspect.sample_rows, 5);
        assert_eq!(config.seed.school, "Hanbit");
        assert_eq!(config.seed.grade, 4);
        assert_eq!(config.seed.section_count, 6);
        assert_eq!(config.seed.rng_seed, Some(99));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: RosterConfig = serde_yaml::from_str("dump: { include_schema: true }").unwrap();
        assert!(config.dump.include_schema);
        assert_eq!(config.dump.output, PathBuf::from("database_dump.sql"));
        assert_eq!(config.database, PathBuf::from("students.db"));
        assert_eq!(config.seed.target(), SeedTarget::new("test", 2, 3));
    }

    #[test]
    fn test_validate_rejects_zero_sections() {
        let config: RosterConfig = serde_yaml::from_str("seed: { section_count: 0 }").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_sample_rows() {
        let config: RosterConfig = serde_yaml::from_str("inspect: { sample_rows: 0 }").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.yml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(RosterConfig::load(&path).unwrap(), RosterConfig::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.yml");

        let original: RosterConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = RosterConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RosterConfig::load("/nonexistent/roster.yml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
