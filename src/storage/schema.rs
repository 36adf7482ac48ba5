//! Database schema definitions
//!
//! This module contains the SQL schema for the tracked-domain inventory.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Parent domains under tracking
CREATE TABLE IF NOT EXISTS domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    scan_interval INTEGER NOT NULL DEFAULT 3600,
    active_scanners TEXT NOT NULL DEFAULT '',
    enable_dns_check INTEGER NOT NULL DEFAULT 1,
    enable_http_check INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    last_scan TEXT
);

-- Hostnames discovered under a tracked domain
CREATE TABLE IF NOT EXISTS subdomains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    subdomain TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    last_checked TEXT,
    status_code INTEGER,
    dns_checked INTEGER NOT NULL DEFAULT 0,
    page_size INTEGER,
    screenshot_path TEXT,
    is_new INTEGER NOT NULL DEFAULT 1,
    UNIQUE(domain_id, subdomain)
);

CREATE INDEX IF NOT EXISTS idx_subdomains_domain ON subdomains(domain_id);
CREATE INDEX IF NOT EXISTS idx_subdomains_new ON subdomains(domain_id, is_new);
"#;

/// Initializes the database schema
///
/// Safe to call on every start; all statements are `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
