//! Output module for inventory reports
//!
//! This module handles:
//! - Building a snapshot of the stored inventory
//! - Rendering it as a markdown report
//! - Printing inventory statistics
//! - Acknowledging reported subdomains

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, DomainStatistics, InventoryStatistics};
pub use summary::{DomainSummary, InventorySummary, OutputError, OutputResult};

use crate::storage::Storage;
use chrono::Utc;

/// Generates an inventory summary from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing the inventory
///
/// # Returns
///
/// * `Ok(InventorySummary)` - Successfully generated summary
/// * `Err(OutputError)` - Failed to read from storage
pub fn generate_summary(storage: &dyn Storage) -> OutputResult<InventorySummary> {
    let mut domains = Vec::new();

    for domain in storage.list_domains()? {
        let subdomains = storage.list_subdomains(domain.id)?;
        let total_subdomains = subdomains.len() as u64;

        let (new_subdomains, seen): (Vec<_>, Vec<_>) =
            subdomains.into_iter().partition(|s| s.is_new);
        let responding = new_subdomains
            .iter()
            .chain(seen.iter())
            .filter(|s| s.status_code.is_some())
            .cloned()
            .collect::<Vec<_>>();

        domains.push(DomainSummary {
            domain,
            total_subdomains,
            new_subdomains,
            responding,
        });
    }

    Ok(InventorySummary {
        generated_at: Utc::now(),
        domains,
    })
}

/// Marks every subdomain reported as new in `summary` as seen
///
/// Subdomains discovered after the summary was generated stay new.
/// Returns the number of subdomains acknowledged.
pub fn acknowledge_new(storage: &mut dyn Storage, summary: &InventorySummary) -> OutputResult<usize> {
    let ids = summary.new_subdomain_ids();
    for id in &ids {
        storage.mark_seen(*id)?;
    }

    tracing::info!("Acknowledged {} new subdomain(s)", ids.len());
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewDomain, SqliteStorage};

    fn populated() -> (SqliteStorage, i64) {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage
            .add_domain(&NewDomain::new("example.com", vec!["crtsh".to_string()]))
            .unwrap();
        let www = storage.add_subdomain(id, "www.example.com").unwrap().unwrap();
        storage.add_subdomain(id, "api.example.com").unwrap();
        let old = storage.add_subdomain(id, "old.example.com").unwrap().unwrap();
        storage.mark_seen(old).unwrap();
        storage.record_http_result(www, 200, 1024).unwrap();
        storage.record_http_result(old, 404, 12).unwrap();
        (storage, id)
    }

    #[test]
    fn test_generate_summary() {
        let (storage, _) = populated();
        let summary = generate_summary(&storage).unwrap();

        assert_eq!(summary.domains.len(), 1);
        let domain = &summary.domains[0];
        assert_eq!(domain.domain.name, "example.com");
        assert_eq!(domain.total_subdomains, 3);
        assert_eq!(domain.new_subdomains.len(), 2);
        assert!(domain.new_subdomains.iter().all(|s| s.is_new));
        assert_eq!(domain.responding.len(), 2);
    }

    #[test]
    fn test_acknowledge_only_reported_subdomains() {
        let (mut storage, id) = populated();
        let summary = generate_summary(&storage).unwrap();

        storage.add_subdomain(id, "late.example.com").unwrap();
        let acknowledged = acknowledge_new(&mut storage, &summary).unwrap();

        assert_eq!(acknowledged, 2);
        let still_new: Vec<_> = storage
            .list_new_subdomains(id)
            .unwrap()
            .into_iter()
            .map(|s| s.subdomain)
            .collect();
        assert_eq!(still_new, vec!["late.example.com"]);
    }

    #[test]
    fn test_empty_inventory() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let summary = generate_summary(&storage).unwrap();
        assert!(summary.domains.is_empty());
        assert_eq!(summary.total_new(), 0);
    }
}
