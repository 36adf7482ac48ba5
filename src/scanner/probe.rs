//! Default DNS and HTTP liveness checks
//!
//! This module provides:
//! - The shared HTTP client used by sources and probes
//! - An HTTP status/size probe
//! - A system-resolver DNS check

use crate::config::{DnsConfig, HttpConfig};
use crate::scanner::collaborators::{DnsCheck, HttpCheck, HttpProbe, SourceError};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds the HTTP client shared by passive sources and the HTTP probe
///
/// Redirects are not followed so a probe records the status the host itself
/// answers with.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probes `https://host/` and falls back to `http://host/`
pub struct HttpProber {
    client: Client,
    schemes: Vec<&'static str>,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            schemes: vec!["https", "http"],
        }
    }

    /// Overrides the schemes tried, in order
    pub fn with_schemes(mut self, schemes: Vec<&'static str>) -> Self {
        self.schemes = schemes;
        self
    }
}

#[async_trait]
impl HttpCheck for HttpProber {
    async fn probe(&self, hostname: &str) -> Result<Option<HttpProbe>, SourceError> {
        for scheme in &self.schemes {
            let url = format!("{}://{}/", scheme, hostname);

            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    tracing::debug!("HTTP request timeout for {}: {}", url, e);
                    continue;
                }
                Err(e) => {
                    tracing::debug!("HTTP request failed for {}: {}", url, e);
                    continue;
                }
            };

            let status_code = response.status().as_u16();
            let page_size = match response.bytes().await {
                Ok(body) => body.len() as u64,
                Err(e) => {
                    tracing::debug!("Failed to read body from {}: {}", url, e);
                    0
                }
            };

            return Ok(Some(HttpProbe {
                status_code,
                page_size,
            }));
        }

        Ok(None)
    }
}

/// Builds the resolver settings for the DNS check
///
/// Name servers and options come from the host's resolver configuration
/// (`/etc/resolv.conf` on Unix). If that cannot be read, the public
/// resolvers of [`ResolverConfig::default`] are used instead. The lookup
/// timeout always comes from `config`.
pub fn resolver_settings(config: &DnsConfig) -> (ResolverConfig, ResolverOpts) {
    let (resolver_config, mut opts) = match read_system_conf() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(
                "Failed to read system resolver configuration, using public resolvers: {}",
                e
            );
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = Duration::from_secs(config.timeout);

    (resolver_config, opts)
}

/// DNS check through the system resolver configuration
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new(config: &DnsConfig) -> Self {
        let (resolver_config, opts) = resolver_settings(config);
        let resolver = TokioAsyncResolver::tokio(resolver_config, opts);

        Self { resolver }
    }
}

#[async_trait]
impl DnsCheck for SystemResolver {
    async fn resolves(&self, hostname: &str) -> Result<bool, SourceError> {
        match self.resolver.lookup_ip(hostname).await {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(e) => {
                tracing::debug!("{} does not resolve: {}", hostname, e);
                Ok(false)
            }
        }
    }
}
