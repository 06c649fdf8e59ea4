//! Configuration for roster database tooling.
//!
//! A single YAML file selects the database, where dumps go, how much
//! inspection output to show, and the default seeding target. Every field
//! has a default, so an empty file is valid and command-line flags only need
//! to override what differs.
//!
//! # Quick start
//!
//! ```no_run
//! use roster_config::RosterConfig;
//!
//! let config = RosterConfig::load("roster.yml").unwrap();
//! println!("database: {}", config.database.display());
//! println!("seed target: {:?}", config.seed.target());
//! ```

mod config;
mod error;

pub use config::{DumpConfig, InspectConfig, RosterConfig, SeedConfig};
pub use error::{ConfigError, Result};
