//! Statistics generation from the inventory database
//!
//! This module provides functionality for extracting and displaying
//! inventory statistics from the storage layer.

use crate::output::OutputResult;
use crate::storage::Storage;
use chrono::{DateTime, Utc};

/// Inventory statistics summary
#[derive(Debug, Clone, Default)]
pub struct InventoryStatistics {
    /// Number of tracked domains
    pub total_domains: u64,

    /// Subdomains across all domains
    pub total_subdomains: u64,

    /// Subdomains not yet acknowledged
    pub new_subdomains: u64,

    /// Subdomains whose DNS validation has run
    pub dns_checked: u64,

    /// Subdomains with a recorded HTTP result
    pub http_checked: u64,

    /// Per-domain breakdown in storage order
    pub domains: Vec<DomainStatistics>,
}

/// Statistics for a single tracked domain
#[derive(Debug, Clone)]
pub struct DomainStatistics {
    pub name: String,
    pub subdomains: u64,
    pub new_subdomains: u64,
    pub dns_checked: u64,
    pub http_checked: u64,
    pub last_scan: Option<DateTime<Utc>>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(InventoryStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<InventoryStatistics> {
    let mut stats = InventoryStatistics {
        total_domains: storage.count_domains()?,
        ..InventoryStatistics::default()
    };

    for domain in storage.list_domains()? {
        let domain_stats = DomainStatistics {
            subdomains: storage.count_subdomains(domain.id)?,
            new_subdomains: storage.count_new_subdomains(domain.id)?,
            dns_checked: storage.count_dns_checked(domain.id)?,
            http_checked: storage.count_http_checked(domain.id)?,
            last_scan: domain.last_scan,
            name: domain.name,
        };

        stats.total_subdomains += domain_stats.subdomains;
        stats.new_subdomains += domain_stats.new_subdomains;
        stats.dns_checked += domain_stats.dns_checked;
        stats.http_checked += domain_stats.http_checked;
        stats.domains.push(domain_stats);
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &InventoryStatistics) {
    println!("=== Inventory Statistics ===\n");

    println!("Overview:");
    println!("  Tracked domains: {}", stats.total_domains);
    println!("  Subdomains: {}", stats.total_subdomains);
    println!("  New (unacknowledged): {}", stats.new_subdomains);
    println!("  DNS checked: {}", stats.dns_checked);
    println!("  HTTP checked: {}", stats.http_checked);
    println!();

    if stats.domains.is_empty() {
        println!("No domains tracked yet.");
        return;
    }

    println!("Domains:");
    for domain in &stats.domains {
        let last_scan = domain
            .last_scan
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {}: {} subdomains ({} new, {} responding), last scan {}",
            domain.name, domain.subdomains, domain.new_subdomains, domain.http_checked, last_scan
        );
    }
    println!();

    let coverage = if stats.total_subdomains > 0 {
        (stats.http_checked as f64 / stats.total_subdomains as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "HTTP coverage: {:.1}% ({} / {} subdomains answered a probe)",
        coverage, stats.http_checked, stats.total_subdomains
    );
}
