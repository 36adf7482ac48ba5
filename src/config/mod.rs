//! Configuration module for subwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use subwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("subwatch.toml")).unwrap();
//! println!("Polling every {}s", config.scheduler.poll_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DnsConfig, DomainEntry, HttpConfig, SchedulerConfig, SourcesConfig, StorageConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
