use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so operators can tell which configuration a process ran with.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[storage]
database-path = "data/subdomains.db"

[scheduler]
poll-interval = 30

[http]
timeout = 5
user-agent = "TestWatcher/1.0"

[[domain]]
name = "example.com"
scanners = ["crtsh", "webarchive"]
scan-interval = 7200
http-check = false

[[domain]]
name = "example.org"
scanners = ["crtsh"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.storage.database_path, "data/subdomains.db");
        assert_eq!(config.scheduler.poll_interval, 30);
        assert_eq!(config.http.timeout, 5);
        assert_eq!(config.http.user_agent, "TestWatcher/1.0");
        assert_eq!(config.domains.len(), 2);

        let first = &config.domains[0];
        assert_eq!(first.scan_interval, 7200);
        assert!(first.dns_check);
        assert!(!first.http_check);

        let second = &config.domains[1];
        assert_eq!(second.scan_interval, 3600);
        assert!(second.http_check);
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = parse_config(
            r#"
[storage]
database-path = "subdomains.db"
"#,
        )
        .unwrap();

        assert_eq!(config.scheduler.poll_interval, 60);
        assert_eq!(config.dns.timeout, 4);
        assert_eq!(config.sources.crtsh_url, "https://crt.sh");
        assert!(config.domains.is_empty());
    }

    #[test]
    fn test_domain_entry_to_new_domain() {
        let config = parse_config(
            r#"
[storage]
database-path = "subdomains.db"

[[domain]]
name = "Example.com"
scanners = ["crtsh"]
dns-check = false
"#,
        )
        .unwrap();

        let new_domain = config.domains[0].to_new_domain();
        assert_eq!(new_domain.name, "example.com");
        assert_eq!(new_domain.scanners, vec!["crtsh"]);
        assert!(!new_domain.enable_dns_check);
        assert!(new_domain.enable_http_check);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/subwatch.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[storage]
database-path = "subdomains.db"

[scheduler]
poll-interval = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
