//! Periodic scan loop
//!
//! Each cycle walks every tracked domain, rescans the ones whose interval has
//! elapsed, and then sleeps for the poll interval. Domains are processed one at
//! a time; a failure while scanning one domain is logged and the cycle moves on.

use crate::hostname::collect_candidates;
use crate::scanner::check::check;
use crate::scanner::collaborators::{DnsCheck, HttpCheck, SubdomainSource};
use crate::storage::{DomainRecord, Storage};
use crate::SubwatchError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default sleep between cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Returns true if `domain` is due for a rescan at `now`
///
/// A domain that was never scanned is always due. Otherwise it is due once
/// strictly more than `scan_interval` seconds have passed since `last_scan`.
pub fn should_scan(domain: &DomainRecord, now: DateTime<Utc>) -> bool {
    let Some(last_scan) = domain.last_scan else {
        return true;
    };

    let next_due = i64::try_from(domain.scan_interval)
        .ok()
        .and_then(ChronoDuration::try_seconds)
        .and_then(|interval| last_scan.checked_add_signed(interval));

    match next_due {
        Some(next_due) => now > next_due,
        // An interval too large to represent never elapses
        None => false,
    }
}

/// Outcome of one pass over the tracked domains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Domains listed at the start of the cycle
    pub domains: usize,
    /// Domains scanned successfully
    pub scanned: usize,
    /// Domains that were not yet due
    pub skipped: usize,
    /// Domains whose scan failed
    pub failed: usize,
    /// Subdomains stored for the first time
    pub new_subdomains: usize,
}

/// The scan scheduler
///
/// Owns the storage handle and the collaborators. Stop it by cancelling the
/// token returned from [`ScanLoop::cancellation_token`].
pub struct ScanLoop<S: Storage> {
    storage: S,
    source: Box<dyn SubdomainSource>,
    dns: Box<dyn DnsCheck>,
    http: Box<dyn HttpCheck>,
    poll_interval: Duration,
    token: CancellationToken,
}

impl<S: Storage> ScanLoop<S> {
    pub fn new(
        storage: S,
        source: Box<dyn SubdomainSource>,
        dns: Box<dyn DnsCheck>,
        http: Box<dyn HttpCheck>,
    ) -> Self {
        Self {
            storage,
            source,
            dns,
            http,
            poll_interval: DEFAULT_POLL_INTERVAL,
            token: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// A handle that stops the loop when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs cycles until the loop is cancelled
    pub async fn run(&mut self) {
        tracing::info!(
            "Scan loop started (poll interval {}s)",
            self.poll_interval.as_secs()
        );

        let token = self.token.clone();

        while !token.is_cancelled() {
            match self.run_cycle().await {
                Ok(report) => tracing::info!(
                    "Cycle complete: {} domains, {} scanned, {} failed, {} new subdomains",
                    report.domains,
                    report.scanned,
                    report.failed,
                    report.new_subdomains
                ),
                Err(e) => tracing::error!("[!] Scan cycle failed: {}", e),
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("Scan loop stopped");
    }

    /// Runs a single pass over all tracked domains
    ///
    /// Only a failure to list the domains is returned as an error. Cancelling
    /// the token abandons the domain in flight, which keeps its old `last_scan`.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, SubwatchError> {
        let token = self.token.clone();
        let domains = self.storage.list_domains()?;
        let mut report = CycleReport {
            domains: domains.len(),
            ..CycleReport::default()
        };

        for domain in &domains {
            if token.is_cancelled() {
                tracing::info!("Cancellation requested, ending cycle early");
                break;
            }

            if !should_scan(domain, Utc::now()) {
                tracing::debug!("{} is not due yet", domain.name);
                report.skipped += 1;
                continue;
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("Cancellation requested, abandoning scan of {}", domain.name);
                    break;
                }
                result = self.scan_domain(domain) => result,
            };

            match result {
                Ok(new_count) => {
                    report.scanned += 1;
                    report.new_subdomains += new_count;
                }
                Err(e) => {
                    tracing::error!("[!] Error while scanning {}: {}", domain.name, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Enumerates, stores and checks one domain; returns the number of new hosts
    async fn scan_domain(&mut self, domain: &DomainRecord) -> Result<usize, SubwatchError> {
        tracing::info!("[*] Scanning {}", domain.name);

        let raw = self.source.enumerate(domain).await?;
        let candidates = collect_candidates(&domain.name, raw);

        let mut new_hosts = Vec::new();
        for hostname in candidates {
            if self
                .storage
                .insert_or_get_subdomain(domain.id, &hostname)?
                .is_new()
            {
                tracing::info!("[+] New subdomain: {}", hostname);
                new_hosts.push(hostname);
            }
        }

        if new_hosts.is_empty() {
            tracing::info!("[-] No new subdomains for {}", domain.name);
        } else {
            let summary = check(
                &mut self.storage,
                domain,
                &new_hosts,
                self.dns.as_ref(),
                self.http.as_ref(),
            )
            .await?;
            tracing::debug!("Checks for {}: {:?}", domain.name, summary);
        }

        self.storage.touch_last_scan(domain.id)?;

        Ok(new_hosts.len())
    }
}
