use url::Url;

/// Maximum length of a full hostname in presentation format
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of one label
const MAX_LABEL_LEN: usize = 63;

/// Normalizes a raw value reported by an enumeration source into a hostname
///
/// Normalization rules:
/// 1. Surrounding whitespace is removed and the value is lowercased
/// 2. A URL is reduced to its host
/// 3. A leading wildcard label (`*.`) is stripped
/// 4. A trailing root dot is stripped
/// 5. The result must be a syntactically valid hostname
///
/// # Examples
///
/// ```
/// use subwatch::hostname::normalize_hostname;
///
/// assert_eq!(normalize_hostname(" WWW.Example.com. "), Some("www.example.com".to_string()));
/// assert_eq!(normalize_hostname("*.dev.example.com"), Some("dev.example.com".to_string()));
/// assert_eq!(normalize_hostname("https://api.example.com/v1"), Some("api.example.com".to_string()));
/// assert_eq!(normalize_hostname("admin@example.com"), None);
/// ```
pub fn normalize_hostname(raw: &str) -> Option<String> {
    let mut host = raw.trim().to_lowercase();

    if host.contains("://") {
        host = Url::parse(&host).ok()?.host_str()?.to_string();
    }

    let host = host.strip_prefix("*.").unwrap_or(&host);
    let host = host.strip_suffix('.').unwrap_or(host);

    if is_valid_hostname(host) {
        Some(host.to_string())
    } else {
        None
    }
}

/// Checks that a name is a syntactically valid DNS hostname
///
/// Labels may contain ASCII letters, digits, hyphens and underscores, must
/// not start or end with a hyphen, and must be 1 to 63 characters long.
pub fn is_valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}
