//! Liveness checks for newly discovered subdomains
//!
//! This is where collaborator results turn into storage mutations. A
//! collaborator failure for one host is logged and the remaining hosts are
//! still checked; storage failures propagate to the caller.

use crate::scanner::collaborators::{DnsCheck, HttpCheck};
use crate::storage::{DomainRecord, Storage, StorageResult};

/// Counters for one run of [`check`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Hosts that DNS validation ran for
    pub dns_checked: usize,
    /// Hosts that resolved
    pub resolved: usize,
    /// Hosts with a recorded HTTP result
    pub http_recorded: usize,
    /// Collaborator calls that failed
    pub failures: usize,
}

/// Runs the DNS and HTTP checks enabled on `domain` for each hostname
///
/// With DNS checking enabled, a host that does not resolve is not probed over
/// HTTP. Hostnames that are not stored under the domain are skipped.
pub async fn check<S>(
    storage: &mut S,
    domain: &DomainRecord,
    hostnames: &[String],
    dns: &dyn DnsCheck,
    http: &dyn HttpCheck,
) -> StorageResult<CheckSummary>
where
    S: Storage + ?Sized,
{
    let mut summary = CheckSummary::default();

    for hostname in hostnames {
        let Some(subdomain_id) = storage.find_subdomain_id(domain.id, hostname)? else {
            tracing::warn!("{} is not stored under {}, skipping checks", hostname, domain.name);
            continue;
        };

        if domain.enable_dns_check {
            match dns.resolves(hostname).await {
                Ok(resolves) => {
                    storage.mark_dns_checked(subdomain_id)?;
                    summary.dns_checked += 1;
                    if resolves {
                        summary.resolved += 1;
                    } else {
                        tracing::debug!("{} does not resolve, skipping HTTP check", hostname);
                        continue;
                    }
                }
                Err(e) => {
                    tracing::warn!("DNS check failed for {}: {}", hostname, e);
                    summary.failures += 1;
                    continue;
                }
            }
        }

        if domain.enable_http_check {
            match http.probe(hostname).await {
                Ok(Some(probe)) => {
                    storage.record_http_result(subdomain_id, probe.status_code, probe.page_size)?;
                    summary.http_recorded += 1;
                    tracing::info!(
                        "[+] {} -> HTTP {} ({} bytes)",
                        hostname,
                        probe.status_code,
                        probe.page_size
                    );
                }
                Ok(None) => tracing::debug!("No HTTP service on {}", hostname),
                Err(e) => {
                    tracing::warn!("HTTP check failed for {}: {}", hostname, e);
                    summary.failures += 1;
                }
            }
        }
    }

    Ok(summary)
}
