//! Report data types
//!
//! An [`InventorySummary`] is a snapshot of the stored inventory that report
//! writers render without touching storage again.

use crate::storage::{DomainRecord, StorageError, SubdomainRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Snapshot of every tracked domain
#[derive(Debug, Clone)]
pub struct InventorySummary {
    pub generated_at: DateTime<Utc>,
    pub domains: Vec<DomainSummary>,
}

/// Snapshot of one tracked domain
#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub domain: DomainRecord,

    /// Number of stored subdomains
    pub total_subdomains: u64,

    /// Subdomains not yet acknowledged, newest first
    pub new_subdomains: Vec<SubdomainRecord>,

    /// Subdomains with a recorded HTTP response, newest first
    pub responding: Vec<SubdomainRecord>,
}

impl InventorySummary {
    pub fn total_subdomains(&self) -> u64 {
        self.domains.iter().map(|d| d.total_subdomains).sum()
    }

    pub fn total_new(&self) -> usize {
        self.domains.iter().map(|d| d.new_subdomains.len()).sum()
    }

    /// IDs of every subdomain reported as new
    pub fn new_subdomain_ids(&self) -> Vec<i64> {
        self.domains
            .iter()
            .flat_map(|d| d.new_subdomains.iter().map(|s| s.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subdomain(id: i64, name: &str) -> SubdomainRecord {
        SubdomainRecord {
            id,
            domain_id: 1,
            subdomain: name.to_string(),
            discovered_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            last_checked: None,
            status_code: None,
            page_size: None,
            dns_checked: false,
            screenshot_path: None,
            is_new: true,
        }
    }

    fn domain_summary(name: &str, total: u64, new: Vec<SubdomainRecord>) -> DomainSummary {
        DomainSummary {
            domain: DomainRecord {
                id: 1,
                name: name.to_string(),
                scan_interval: 3600,
                active_scanners: vec!["crtsh".to_string()],
                enable_dns_check: true,
                enable_http_check: true,
                created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                last_scan: None,
            },
            total_subdomains: total,
            new_subdomains: new,
            responding: vec![],
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = InventorySummary {
            generated_at: Utc::now(),
            domains: vec![
                domain_summary("example.com", 5, vec![subdomain(3, "a.example.com")]),
                domain_summary(
                    "example.org",
                    2,
                    vec![subdomain(7, "b.example.org"), subdomain(8, "c.example.org")],
                ),
            ],
        };

        assert_eq!(summary.total_subdomains(), 7);
        assert_eq!(summary.total_new(), 3);
        assert_eq!(summary.new_subdomain_ids(), vec![3, 7, 8]);
    }
}
