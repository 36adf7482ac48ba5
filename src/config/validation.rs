use crate::config::types::{
    Config, DnsConfig, DomainEntry, HttpConfig, SchedulerConfig, SourcesConfig, StorageConfig,
};
use crate::hostname::is_valid_hostname;
use crate::scanner::KNOWN_SOURCES;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_http_config(&config.http)?;
    validate_dns_config(&config.dns)?;
    validate_sources_config(&config.sources)?;
    validate_domains(&config.domains)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.poll_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "poll-interval must be >= 1 second, got {}",
            config.poll_interval
        )));
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 || config.timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "http timeout must be between 1 and 300 seconds, got {}",
            config.timeout
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_dns_config(config: &DnsConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 || config.timeout > 60 {
        return Err(ConfigError::Validation(format!(
            "dns timeout must be between 1 and 60 seconds, got {}",
            config.timeout
        )));
    }
    Ok(())
}

fn validate_sources_config(config: &SourcesConfig) -> Result<(), ConfigError> {
    validate_base_url("crtsh-url", &config.crtsh_url)?;
    validate_base_url("webarchive-url", &config.webarchive_url)?;
    Ok(())
}

/// Source base URLs must be absolute http(s) URLs
fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} '{}': {}", key, value, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    Ok(())
}

/// Validates declared domains
fn validate_domains(domains: &[DomainEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in domains {
        validate_domain_name(&entry.name)?;

        if !seen.insert(entry.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' is declared more than once",
                entry.name
            )));
        }

        if entry.scanners.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' must list at least one scanner",
                entry.name
            )));
        }

        for scanner in &entry.scanners {
            if !KNOWN_SOURCES.contains(&scanner.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Domain '{}' uses unknown scanner '{}' (known: {})",
                    entry.name,
                    scanner,
                    KNOWN_SOURCES.join(", ")
                )));
            }
        }

        if entry.scan_interval < 1 {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' scan-interval must be >= 1 second",
                entry.name
            )));
        }
    }

    Ok(())
}

/// Validates a tracked domain name
fn validate_domain_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "Domain name cannot be empty".to_string(),
        ));
    }

    if !is_valid_hostname(&name.to_lowercase()) {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' is not a valid hostname",
            name
        )));
    }

    // Must contain at least one dot (e.g., example.com, not just "example")
    if !name.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, scanners: &[&str]) -> DomainEntry {
        DomainEntry {
            name: name.to_string(),
            scanners: scanners.iter().map(|s| s.to_string()).collect(),
            scan_interval: 3600,
            dns_check: true,
            http_check: true,
        }
    }

    #[test]
    fn test_validate_domain_name() {
        assert!(validate_domain_name("example.com").is_ok());
        assert!(validate_domain_name("sub.example.co.uk").is_ok());

        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name("example").is_err());
        assert!(validate_domain_name(".example.com").is_err());
        assert!(validate_domain_name("*.example.com").is_err());
        assert!(validate_domain_name("exa mple.com").is_err());
    }

    #[test]
    fn test_duplicate_domains_rejected() {
        let domains = vec![entry("example.com", &["crtsh"]), entry("EXAMPLE.com", &["crtsh"])];
        assert!(validate_domains(&domains).is_err());
    }

    #[test]
    fn test_unknown_scanner_rejected() {
        let domains = vec![entry("example.com", &["crtsh", "shodan"])];
        let err = validate_domains(&domains).unwrap_err();
        assert!(err.to_string().contains("shodan"));
    }

    #[test]
    fn test_empty_scanner_list_rejected() {
        assert!(validate_domains(&[entry("example.com", &[])]).is_err());
    }

    #[test]
    fn test_zero_scan_interval_rejected() {
        let mut domain = entry("example.com", &["crtsh"]);
        domain.scan_interval = 0;
        assert!(validate_domains(&[domain]).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("crtsh-url", "https://crt.sh").is_ok());
        assert!(validate_base_url("crtsh-url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_base_url("crtsh-url", "ftp://crt.sh").is_err());
        assert!(validate_base_url("crtsh-url", "not a url").is_err());
    }

    #[test]
    fn test_timeouts_bounded() {
        assert!(validate_http_config(&HttpConfig {
            timeout: 0,
            user_agent: "x".to_string()
        })
        .is_err());
        assert!(validate_dns_config(&DnsConfig { timeout: 61 }).is_err());
        assert!(validate_dns_config(&DnsConfig { timeout: 4 }).is_ok());
    }
}
