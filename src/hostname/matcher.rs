/// Checks whether a hostname sits under a parent domain
///
/// The parent itself does not count; only proper subdomains match.
///
/// # Examples
///
/// ```
/// use subwatch::hostname::is_subdomain_of;
///
/// assert!(is_subdomain_of("api.example.com", "example.com"));
/// assert!(is_subdomain_of("a.b.example.com", "example.com"));
/// assert!(!is_subdomain_of("example.com", "example.com"));
/// assert!(!is_subdomain_of("badexample.com", "example.com"));
/// ```
pub fn is_subdomain_of(candidate: &str, parent: &str) -> bool {
    candidate.len() > parent.len() + 1
        && candidate.ends_with(parent)
        && candidate.as_bytes()[candidate.len() - parent.len() - 1] == b'.'
}
