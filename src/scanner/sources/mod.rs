//! Passive (OSINT) enumeration sources
//!
//! Each source queries a public dataset for hostnames under a domain without
//! touching the target. [`SourceRegistry`] selects sources by the names stored
//! on each domain and merges their output.

mod crtsh;
mod webarchive;

pub use crtsh::CrtSh;
pub use webarchive::WebArchive;

use crate::config::SourcesConfig;
use crate::scanner::collaborators::{SourceError, SubdomainSource};
use crate::storage::DomainRecord;
use async_trait::async_trait;
use reqwest::Client;

/// Names accepted in a domain's scanner list
pub const KNOWN_SOURCES: &[&str] = &[CrtSh::NAME, WebArchive::NAME];

/// A single passive enumeration source
#[async_trait]
pub trait PassiveSource: Send + Sync {
    /// Name used in a domain's scanner list
    fn name(&self) -> &'static str;

    async fn enumerate(&self, domain: &str) -> Result<Vec<String>, SourceError>;
}

/// Runs the sources a domain asks for and merges their results
///
/// Unknown names are skipped with a warning. One failing source does not fail
/// the scan as long as another requested source succeeded.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Box<dyn PassiveSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry with every built-in source
    pub fn from_config(client: Client, config: &SourcesConfig) -> Self {
        Self::new()
            .register(CrtSh::new(client.clone(), &config.crtsh_url))
            .register(WebArchive::new(client, &config.webarchive_url))
    }

    pub fn register<P: PassiveSource + 'static>(mut self, source: P) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    fn get(&self, name: &str) -> Option<&dyn PassiveSource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }
}

#[async_trait]
impl SubdomainSource for SourceRegistry {
    async fn enumerate(&self, domain: &DomainRecord) -> Result<Vec<String>, SourceError> {
        if domain.active_scanners.is_empty() {
            tracing::warn!("{} has no scanners configured", domain.name);
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        let mut attempted = 0;
        let mut failed = 0;
        let mut unknown = Vec::new();

        for name in &domain.active_scanners {
            let Some(source) = self.get(name) else {
                tracing::warn!("Unknown scanner '{}' for {}", name, domain.name);
                unknown.push(name.as_str());
                continue;
            };

            attempted += 1;
            match source.enumerate(&domain.name).await {
                Ok(hosts) => {
                    tracing::debug!("{} returned {} hosts for {}", name, hosts.len(), domain.name);
                    found.extend(hosts);
                }
                Err(e) => {
                    tracing::warn!("{} failed for {}: {}", name, domain.name, e);
                    failed += 1;
                }
            }
        }

        if attempted == 0 {
            return Err(SourceError::UnknownSource {
                domain: domain.name.clone(),
                names: unknown.join(", "),
            });
        }

        if failed == attempted {
            return Err(SourceError::AllSourcesFailed {
                domain: domain.name.clone(),
                attempted,
            });
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixed {
        name: &'static str,
        hosts: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl PassiveSource for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn enumerate(&self, _domain: &str) -> Result<Vec<String>, SourceError> {
            match &self.hosts {
                Some(hosts) => Ok(hosts.iter().map(|h| h.to_string()).collect()),
                None => Err(SourceError::InvalidResponse(self.name.to_string())),
            }
        }
    }

    fn domain(scanners: &[&str]) -> DomainRecord {
        DomainRecord {
            id: 1,
            name: "example.com".to_string(),
            scan_interval: 3600,
            active_scanners: scanners.iter().map(|s| s.to_string()).collect(),
            enable_dns_check: true,
            enable_http_check: true,
            created_at: Utc::now(),
            last_scan: None,
        }
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new()
            .register(Fixed {
                name: "good",
                hosts: Some(vec!["a.example.com", "b.example.com"]),
            })
            .register(Fixed {
                name: "broken",
                hosts: None,
            })
    }

    #[test]
    fn test_known_sources_match_builtins() {
        let registry = SourceRegistry::from_config(Client::new(), &SourcesConfig::default());
        assert_eq!(registry.names(), KNOWN_SOURCES.to_vec());
    }

    #[tokio::test]
    async fn test_merges_requested_sources() {
        let hosts = registry().enumerate(&domain(&["good"])).await.unwrap();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }

    #[tokio::test]
    async fn test_partial_failure_still_succeeds() {
        let hosts = registry()
            .enumerate(&domain(&["broken", "good"]))
            .await
            .unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[tokio::test]
    async fn test_all_failed_is_an_error() {
        let result = registry().enumerate(&domain(&["broken"])).await;
        assert!(matches!(
            result,
            Err(SourceError::AllSourcesFailed { attempted: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_only_unknown_sources_is_an_error() {
        let result = registry().enumerate(&domain(&["shodan"])).await;
        assert!(matches!(result, Err(SourceError::UnknownSource { .. })));
    }

    #[tokio::test]
    async fn test_unknown_source_is_skipped() {
        let hosts = registry()
            .enumerate(&domain(&["shodan", "good"]))
            .await
            .unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[tokio::test]
    async fn test_no_scanners_yields_nothing() {
        let hosts = registry().enumerate(&domain(&[])).await.unwrap();
        assert!(hosts.is_empty());
    }
}
