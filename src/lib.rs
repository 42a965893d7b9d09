//! Seine: a multi-platform social post harvester
//!
//! This crate fetches public posts from three social-platform APIs (a wall
//! API, a group-feed API, and a message-stream API), filters them by keyword
//! and date window, and merges the matches into a spreadsheet report that is
//! extended across runs as long as the target list stays the same.

pub mod config;
pub mod harvest;
pub mod matcher;
pub mod platform;
pub mod report;
pub mod resolve;

use thiserror::Error;

/// Main error type for Seine operations
#[derive(Debug, Error)]
pub enum SeineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request gateway error: {0}")]
    Gateway(#[from] platform::GatewayError),

    #[error("Authentication error: {0}")]
    Auth(#[from] platform::AuthError),

    #[error("Report error: {0}")]
    Report(#[from] report::ReportError),

    #[error("Target input error: {0}")]
    Input(#[from] resolve::InputError),

    #[error("Missing credential: {0} is not set in the environment")]
    MissingCredential(&'static str),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to read or write run state: {0}")]
    RunState(#[from] serde_json::Error),
}

/// Result type alias for Seine operations
pub type Result<T> = std::result::Result<T, SeineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{CancelFlag, DateWindow, HarvestSummary, ProgressEvent};
pub use matcher::{match_posts, MatchResult};
pub use platform::{Platform, Post};
pub use resolve::{resolve, Target, TargetSet};
