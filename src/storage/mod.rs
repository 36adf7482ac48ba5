//! Storage module for the tracked-domain inventory
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Domain registration, listing and cascading deletion
//! - Subdomain discovery with duplicate detection
//! - Lifecycle flags (new/seen, DNS checked, HTTP results)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::SubwatchError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Seconds between rescans when a domain does not specify its own interval
pub const DEFAULT_SCAN_INTERVAL: u64 = 3600;

/// Separator used to store the scanner list in a single column
const SCANNER_SEPARATOR: char = ',';

/// Opens (creating if needed) a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SubwatchError> {
    Ok(SqliteStorage::new(path)?)
}

/// A tracked parent domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub id: i64,
    pub name: String,
    /// Seconds between rescans
    pub scan_interval: u64,
    /// Enumeration sources to run, in order
    pub active_scanners: Vec<String>,
    pub enable_dns_check: bool,
    pub enable_http_check: bool,
    pub created_at: DateTime<Utc>,
    /// Completion time of the most recent scan, `None` until the first one
    pub last_scan: Option<DateTime<Utc>>,
}

/// A hostname discovered under a tracked domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainRecord {
    pub id: i64,
    pub domain_id: i64,
    pub subdomain: String,
    pub discovered_at: DateTime<Utc>,
    /// Time of the most recent HTTP check
    pub last_checked: Option<DateTime<Utc>>,
    pub status_code: Option<u16>,
    pub page_size: Option<u64>,
    pub dns_checked: bool,
    pub screenshot_path: Option<String>,
    /// True until an operator acknowledges the subdomain
    pub is_new: bool,
}

/// Parameters for registering a new domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub name: String,
    pub scanners: Vec<String>,
    pub scan_interval: u64,
    pub enable_dns_check: bool,
    pub enable_http_check: bool,
}

impl NewDomain {
    /// Creates a registration with the default interval and both checks enabled
    pub fn new(name: impl Into<String>, scanners: Vec<String>) -> Self {
        Self {
            name: name.into(),
            scanners,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            enable_dns_check: true,
            enable_http_check: true,
        }
    }

    pub fn with_interval(mut self, seconds: u64) -> Self {
        self.scan_interval = seconds;
        self
    }

    pub fn with_dns_check(mut self, enabled: bool) -> Self {
        self.enable_dns_check = enabled;
        self
    }

    pub fn with_http_check(mut self, enabled: bool) -> Self {
        self.enable_http_check = enabled;
        self
    }
}

/// Result of inserting a subdomain that may already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created with this ID
    Inserted(i64),
    /// The hostname was already known under this ID
    Existing(i64),
}

impl InsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Existing(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Joins a scanner list into its column representation
pub(crate) fn encode_scanners(scanners: &[String]) -> String {
    scanners
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(&SCANNER_SEPARATOR.to_string())
}

/// Splits a stored scanner column back into names
pub(crate) fn decode_scanners(column: &str) -> Vec<String> {
    column
        .split(SCANNER_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats a timestamp as fixed-width RFC 3339 so text order matches time order
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc))
}
