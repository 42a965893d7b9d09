//! Configuration module for Seine
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, persisting the between-run state, and reading API credentials from
//! the process environment.
//!
//! # Example
//!
//! ```no_run
//! use seine::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Harvest concurrency: {}", config.harvest.concurrency);
//! ```

mod parser;
mod run_state;
mod secrets;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HarvestConfig, OutputConfig, PlatformsConfig};

// Re-export parser functions
pub use parser::load_config;

pub use run_state::{RunState, RUN_STATE_FILE};
pub use secrets::Secrets;
