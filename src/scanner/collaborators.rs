//! Collaborator interfaces consumed by the scan loop
//!
//! Enumeration, DNS resolution and HTTP probing are black boxes to the
//! scheduler. The loop only sees these traits, so tests and embedders can
//! substitute their own implementations.

use crate::storage::DomainRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by external collaborators
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error from {source_name}: {error}")]
    Http {
        source_name: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("Invalid response from {0}")]
    InvalidResponse(String),

    #[error("Unknown scanner(s) for {domain}: {names}")]
    UnknownSource { domain: String, names: String },

    #[error("All {attempted} scanner(s) failed for {domain}")]
    AllSourcesFailed { domain: String, attempted: usize },

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Result of an HTTP liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpProbe {
    pub status_code: u16,
    /// Body size in bytes
    pub page_size: u64,
}

/// Discovers candidate hostnames for a tracked domain
///
/// The domain's `active_scanners` list decides which tools run. The returned
/// values may be unnormalized and may contain duplicates.
#[async_trait]
pub trait SubdomainSource: Send + Sync {
    async fn enumerate(&self, domain: &DomainRecord) -> Result<Vec<String>, SourceError>;
}

/// Confirms that a hostname currently resolves
#[async_trait]
pub trait DnsCheck: Send + Sync {
    async fn resolves(&self, hostname: &str) -> Result<bool, SourceError>;
}

/// Issues a web request to a hostname
///
/// `Ok(None)` means no HTTP service answered.
#[async_trait]
pub trait HttpCheck: Send + Sync {
    async fn probe(&self, hostname: &str) -> Result<Option<HttpProbe>, SourceError>;
}
