//! Scanner module for periodic subdomain discovery
//!
//! This module contains the scanning side of subwatch, including:
//! - Collaborator traits for enumeration, DNS and HTTP checks
//! - Default passive sources and liveness probes
//! - The check step applied to newly discovered hosts
//! - The scan loop that decides when each domain is due

mod check;
mod collaborators;
mod probe;
mod scheduler;
mod sources;

pub use check::{check, CheckSummary};
pub use collaborators::{DnsCheck, HttpCheck, HttpProbe, SourceError, SubdomainSource};
pub use probe::{build_http_client, resolver_settings, HttpProber, SystemResolver};
pub use scheduler::{should_scan, CycleReport, ScanLoop, DEFAULT_POLL_INTERVAL};
pub use sources::{CrtSh, PassiveSource, SourceRegistry, WebArchive, KNOWN_SOURCES};

use crate::config::{Config, DomainEntry};
use crate::storage::{open_storage, SqliteStorage, Storage, StorageResult};
use crate::SubwatchError;
use std::path::Path;
use std::time::Duration;

/// Registers declared domains that are not stored yet
///
/// Domains already present are left untouched, including their scan settings.
/// Returns the number of domains added.
pub fn sync_declared_domains<S>(storage: &mut S, entries: &[DomainEntry]) -> StorageResult<usize>
where
    S: Storage + ?Sized,
{
    let mut added = 0;

    for entry in entries {
        let new_domain = entry.to_new_domain();
        if storage.find_domain_by_name(&new_domain.name)?.is_some() {
            tracing::debug!("{} is already tracked", new_domain.name);
            continue;
        }

        let id = storage.add_domain(&new_domain)?;
        tracing::info!("Tracking new domain {} (id {})", new_domain.name, id);
        added += 1;
    }

    Ok(added)
}

/// Builds a scan loop with the default collaborators
///
/// # Arguments
///
/// * `config` - The loaded configuration
///
/// # Returns
///
/// * `Ok(ScanLoop)` - Storage opened and declared domains registered
/// * `Err(SubwatchError)` - Failed to open storage or build the HTTP client
pub fn build_scan_loop(config: &Config) -> Result<ScanLoop<SqliteStorage>, SubwatchError> {
    let mut storage = open_storage(Path::new(&config.storage.database_path))?;
    let added = sync_declared_domains(&mut storage, &config.domains)?;
    if added > 0 {
        tracing::info!("Registered {} declared domain(s)", added);
    }

    let client = build_http_client(&config.http)?;
    let registry = SourceRegistry::from_config(client.clone(), &config.sources);

    Ok(ScanLoop::new(
        storage,
        Box::new(registry),
        Box::new(SystemResolver::new(&config.dns)),
        Box::new(HttpProber::new(client)),
    )
    .with_poll_interval(Duration::from_secs(config.scheduler.poll_interval)))
}
