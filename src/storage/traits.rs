//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{DomainRecord, InsertOutcome, NewDomain, SubdomainRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Domain already tracked: {0}")]
    DuplicateDomain(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every method is a single logical operation; there is no transaction
/// spanning two calls.
pub trait Storage {
    /// Ensures the schema exists. Idempotent.
    fn initialize(&mut self) -> StorageResult<()>;

    // ===== Domains =====

    /// Inserts a new tracked domain and returns its ID
    ///
    /// Fails with [`StorageError::DuplicateDomain`] if the name is taken.
    fn add_domain(&mut self, domain: &NewDomain) -> StorageResult<i64>;

    /// Lists every tracked domain in storage order
    fn list_domains(&self) -> StorageResult<Vec<DomainRecord>>;

    /// Gets a domain by ID
    fn get_domain(&self, domain_id: i64) -> StorageResult<DomainRecord>;

    /// Gets a domain by its name
    fn find_domain_by_name(&self, name: &str) -> StorageResult<Option<DomainRecord>>;

    /// Deletes a domain together with all of its subdomains
    ///
    /// Deleting an unknown ID is a no-op.
    fn delete_domain(&mut self, domain_id: i64) -> StorageResult<()>;

    /// Sets `last_scan` to the current time
    fn touch_last_scan(&mut self, domain_id: i64) -> StorageResult<()>;

    // ===== Subdomains =====

    /// Inserts a hostname, or reports the ID of the existing row
    ///
    /// A uniqueness conflict on `(domain_id, hostname)` yields
    /// [`InsertOutcome::Existing`]; any other failure is an error.
    fn insert_or_get_subdomain(
        &mut self,
        domain_id: i64,
        hostname: &str,
    ) -> StorageResult<InsertOutcome>;

    /// Inserts a hostname, returning `None` if it was already known
    fn add_subdomain(&mut self, domain_id: i64, hostname: &str) -> StorageResult<Option<i64>> {
        Ok(match self.insert_or_get_subdomain(domain_id, hostname)? {
            InsertOutcome::Inserted(id) => Some(id),
            InsertOutcome::Existing(_) => None,
        })
    }

    /// Looks up the ID of a hostname under a domain
    fn find_subdomain_id(&self, domain_id: i64, hostname: &str) -> StorageResult<Option<i64>>;

    /// Lists all subdomains of a domain, newest discovery first
    fn list_subdomains(&self, domain_id: i64) -> StorageResult<Vec<SubdomainRecord>>;

    /// Lists subdomains still flagged as new, newest discovery first
    fn list_new_subdomains(&self, domain_id: i64) -> StorageResult<Vec<SubdomainRecord>>;

    /// Clears the `is_new` flag of one subdomain
    fn mark_seen(&mut self, subdomain_id: i64) -> StorageResult<()>;

    /// Records that DNS validation ran for a subdomain
    fn mark_dns_checked(&mut self, subdomain_id: i64) -> StorageResult<()>;

    /// Stores the result of an HTTP check and stamps `last_checked`
    fn record_http_result(
        &mut self,
        subdomain_id: i64,
        status_code: u16,
        page_size: u64,
    ) -> StorageResult<()>;

    /// Stores the path of a captured screenshot
    fn set_screenshot_path(&mut self, subdomain_id: i64, path: &str) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts tracked domains
    fn count_domains(&self) -> StorageResult<u64>;

    /// Counts all subdomains of a domain
    fn count_subdomains(&self, domain_id: i64) -> StorageResult<u64>;

    /// Counts subdomains still flagged as new
    fn count_new_subdomains(&self, domain_id: i64) -> StorageResult<u64>;

    /// Counts subdomains whose DNS validation has run
    fn count_dns_checked(&self, domain_id: i64) -> StorageResult<u64>;

    /// Counts subdomains with a recorded HTTP result
    fn count_http_checked(&self, domain_id: i64) -> StorageResult<u64>;
}
