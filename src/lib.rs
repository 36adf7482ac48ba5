//! subwatch: a tracked-domain subdomain monitor
//!
//! This crate keeps an inventory of subdomains discovered for a set of
//! tracked parent domains. A scan loop periodically re-enumerates each domain
//! through passive sources, records newly seen hosts, and checks whether they
//! resolve and answer over HTTP.

pub mod config;
pub mod hostname;
pub mod output;
pub mod scanner;
pub mod storage;

use thiserror::Error;

/// Main error type for subwatch operations
#[derive(Debug, Error)]
pub enum SubwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Source error: {0}")]
    Source(#[from] scanner::SourceError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
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
}

/// Result type alias for subwatch operations
pub type Result<T> = std::result::Result<T, SubwatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use scanner::{should_scan, ScanLoop};
pub use storage::{DomainRecord, SqliteStorage, Storage, SubdomainRecord};
