//! Markdown inventory report
//!
//! This module renders an [`InventorySummary`] as a human-readable markdown
//! report, listing new subdomains first and responding hosts after.

use crate::output::{DomainSummary, InventorySummary, OutputResult};
use crate::storage::SubdomainRecord;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum rows in a per-domain "responding" table
const MAX_RESPONDING_ROWS: usize = 50;

/// Writes a markdown report to `output_path`
///
/// # Arguments
///
/// * `summary` - The inventory snapshot
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_summary(summary: &InventorySummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an inventory snapshot as markdown
pub fn format_markdown_summary(summary: &InventorySummary) -> String {
    let mut md = String::new();

    md.push_str("# Subdomain Inventory\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        format_time(summary.generated_at)
    ));
    md.push_str(&format!(
        "- **Tracked Domains**: {}\n",
        summary.domains.len()
    ));
    md.push_str(&format!(
        "- **Subdomains**: {}\n",
        summary.total_subdomains()
    ));
    md.push_str(&format!("- **New Subdomains**: {}\n\n", summary.total_new()));

    if summary.domains.is_empty() {
        md.push_str("No domains are tracked yet.\n");
        return md;
    }

    for domain in &summary.domains {
        push_domain_section(&mut md, domain);
    }

    md
}

fn push_domain_section(md: &mut String, summary: &DomainSummary) {
    let domain = &summary.domain;

    md.push_str(&format!("## {}\n\n", domain.name));
    md.push_str(&format!(
        "- **Scanners**: {}\n",
        if domain.active_scanners.is_empty() {
            "none".to_string()
        } else {
            domain.active_scanners.join(", ")
        }
    ));
    md.push_str(&format!(
        "- **Scan Interval**: {} seconds\n",
        domain.scan_interval
    ));
    md.push_str(&format!(
        "- **Checks**: DNS {}, HTTP {}\n",
        on_off(domain.enable_dns_check),
        on_off(domain.enable_http_check)
    ));
    md.push_str(&format!(
        "- **Last Scan**: {}\n",
        domain
            .last_scan
            .map(format_time)
            .unwrap_or_else(|| "never".to_string())
    ));
    md.push_str(&format!(
        "- **Subdomains**: {}\n\n",
        summary.total_subdomains
    ));

    if !summary.new_subdomains.is_empty() {
        md.push_str(&format!(
            "### New Subdomains ({})\n\n",
            summary.new_subdomains.len()
        ));
        push_subdomain_table(md, &summary.new_subdomains);
    }

    if !summary.responding.is_empty() {
        md.push_str(&format!(
            "### Responding Hosts ({})\n\n",
            summary.responding.len()
        ));
        push_subdomain_table(
            md,
            &summary.responding[..summary.responding.len().min(MAX_RESPONDING_ROWS)],
        );
        if summary.responding.len() > MAX_RESPONDING_ROWS {
            md.push_str(&format!(
                "... and {} more\n\n",
                summary.responding.len() - MAX_RESPONDING_ROWS
            ));
        }
    }
}

fn push_subdomain_table(md: &mut String, rows: &[SubdomainRecord]) {
    md.push_str("| Subdomain | Discovered | DNS | Status | Size |\n");
    md.push_str("|-----------|------------|-----|--------|------|\n");

    for row in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.subdomain,
            format_time(row.discovered_at),
            if row.dns_checked { "checked" } else { "-" },
            row.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.page_size
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    md.push('\n');
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
