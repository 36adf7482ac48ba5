use crate::storage::{NewDomain, DEFAULT_SCAN_INTERVAL};
use serde::Deserialize;

/// Main configuration structure for subwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Domains that should be tracked; registered on startup if missing
    #[serde(default, rename = "domain")]
    pub domains: Vec<DomainEntry>,
}

/// Database location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Scan loop timing
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds to sleep between cycles
    #[serde(rename = "poll-interval", default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

/// HTTP client settings shared by passive sources and the HTTP check
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// DNS check settings
#[derive(Debug, Clone, Deserialize)]
pub struct DnsConfig {
    /// Lookup timeout in seconds
    #[serde(default = "default_dns_timeout")]
    pub timeout: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout: default_dns_timeout(),
        }
    }
}

/// Base URLs of the passive enumeration sources
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(rename = "crtsh-url", default = "default_crtsh_url")]
    pub crtsh_url: String,

    #[serde(rename = "webarchive-url", default = "default_webarchive_url")]
    pub webarchive_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            crtsh_url: default_crtsh_url(),
            webarchive_url: default_webarchive_url(),
        }
    }
}

/// A domain declared in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntry {
    /// Parent domain (e.g., "example.com")
    pub name: String,

    /// Enumeration sources to run, in order
    pub scanners: Vec<String>,

    /// Seconds between rescans
    #[serde(rename = "scan-interval", default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(rename = "dns-check", default = "default_true")]
    pub dns_check: bool,

    #[serde(rename = "http-check", default = "default_true")]
    pub http_check: bool,
}

impl DomainEntry {
    /// Converts the entry into a storage registration
    pub fn to_new_domain(&self) -> NewDomain {
        NewDomain::new(self.name.to_lowercase(), self.scanners.clone())
            .with_interval(self.scan_interval)
            .with_dns_check(self.dns_check)
            .with_http_check(self.http_check)
    }
}

fn default_poll_interval() -> u64 {
    60
}

fn default_http_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("subwatch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_dns_timeout() -> u64 {
    4
}

fn default_crtsh_url() -> String {
    "https://crt.sh".to_string()
}

fn default_webarchive_url() -> String {
    "https://web.archive.org".to_string()
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

fn default_true() -> bool {
    true
}
