//! Hostname handling
//!
//! Enumeration sources return loosely formatted values (wildcards, URLs,
//! mixed case, names outside the target). This module turns them into the
//! canonical hostnames that are stored.

mod matcher;
mod normalize;

pub use matcher::is_subdomain_of;
pub use normalize::{is_valid_hostname, normalize_hostname};

use std::collections::HashSet;

/// Normalizes raw enumeration output into unique subdomains of `parent`
///
/// Order of first appearance is preserved. Values that do not normalize, the
/// parent itself, and hosts outside the parent are dropped.
///
/// # Examples
///
/// ```
/// use subwatch::hostname::collect_candidates;
///
/// let raw = vec![
///     "WWW.example.com".to_string(),
///     "*.api.example.com".to_string(),
///     "www.example.com".to_string(),
///     "example.com".to_string(),
///     "cdn.other.net".to_string(),
/// ];
/// assert_eq!(
///     collect_candidates("example.com", raw),
///     vec!["www.example.com", "api.example.com"]
/// );
/// ```
pub fn collect_candidates<I>(parent: &str, raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let parent = parent.to_lowercase();
    let mut seen = HashSet::new();

    raw.into_iter()
        .filter_map(|value| normalize_hostname(&value))
        .filter(|host| is_subdomain_of(host, &parent))
        .filter(|host| seen.insert(host.clone()))
        .collect()
}
