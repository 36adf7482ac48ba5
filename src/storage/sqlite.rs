//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! A single connection is held for the lifetime of the storage handle.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    decode_scanners, encode_scanners, format_timestamp, parse_timestamp, DomainRecord,
    InsertOutcome, NewDomain, SubdomainRecord,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const DOMAIN_COLUMNS: &str = "id, name, scan_interval, active_scanners, enable_dns_check,
     enable_http_check, created_at, last_scan";

const SUBDOMAIN_COLUMNS: &str = "id, domain_id, subdomain, discovered_at, last_checked,
     status_code, page_size, dns_checked, screenshot_path, is_new";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and ensures the schema exists
    ///
    /// Missing parent directories are created.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        let mut storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    fn query_subdomains(&self, sql: &str, domain_id: i64) -> StorageResult<Vec<SubdomainRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let subdomains = stmt
            .query_map(params![domain_id], subdomain_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subdomains)
    }

    fn count(&self, sql: &str, domain_id: i64) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row(sql, params![domain_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    fn initialize(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    // ===== Domains =====

    fn add_domain(&mut self, domain: &NewDomain) -> StorageResult<i64> {
        let now = format_timestamp(Utc::now());
        let result = self.conn.execute(
            "INSERT INTO domains (name, scan_interval, active_scanners, enable_dns_check,
             enable_http_check, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                domain.name,
                domain.scan_interval as i64,
                encode_scanners(&domain.scanners),
                domain.enable_dns_check,
                domain.enable_http_check,
                now
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateDomain(domain.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_domains(&self) -> StorageResult<Vec<DomainRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {DOMAIN_COLUMNS} FROM domains ORDER BY id"))?;

        let domains = stmt
            .query_map([], domain_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(domains)
    }

    fn get_domain(&self, domain_id: i64) -> StorageResult<DomainRecord> {
        self.conn
            .query_row(
                &format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE id = ?1"),
                params![domain_id],
                domain_from_row,
            )
            .optional()?
            .ok_or(StorageError::DomainNotFound(domain_id))
    }

    fn find_domain_by_name(&self, name: &str) -> StorageResult<Option<DomainRecord>> {
        let domain = self
            .conn
            .query_row(
                &format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE name = ?1"),
                params![name],
                domain_from_row,
            )
            .optional()?;
        Ok(domain)
    }

    fn delete_domain(&mut self, domain_id: i64) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM subdomains WHERE domain_id = ?1",
            params![domain_id],
        )?;
        tx.execute("DELETE FROM domains WHERE id = ?1", params![domain_id])?;
        tx.commit()?;
        Ok(())
    }

    fn touch_last_scan(&mut self, domain_id: i64) -> StorageResult<()> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "UPDATE domains SET last_scan = ?1 WHERE id = ?2",
            params![now, domain_id],
        )?;
        Ok(())
    }

    // ===== Subdomains =====

    fn insert_or_get_subdomain(
        &mut self,
        domain_id: i64,
        hostname: &str,
    ) -> StorageResult<InsertOutcome> {
        let now = format_timestamp(Utc::now());
        let inserted = self.conn.execute(
            "INSERT INTO subdomains (domain_id, subdomain, discovered_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(domain_id, subdomain) DO NOTHING",
            params![domain_id, hostname, now],
        )?;

        if inserted == 1 {
            return Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid()));
        }

        let existing: i64 = self.conn.query_row(
            "SELECT id FROM subdomains WHERE domain_id = ?1 AND subdomain = ?2",
            params![domain_id, hostname],
            |row| row.get(0),
        )?;
        Ok(InsertOutcome::Existing(existing))
    }

    fn find_subdomain_id(&self, domain_id: i64, hostname: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM subdomains WHERE domain_id = ?1 AND subdomain = ?2",
                params![domain_id, hostname],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_subdomains(&self, domain_id: i64) -> StorageResult<Vec<SubdomainRecord>> {
        self.query_subdomains(
            &format!(
                "SELECT {SUBDOMAIN_COLUMNS} FROM subdomains WHERE domain_id = ?1
                 ORDER BY discovered_at DESC, id DESC"
            ),
            domain_id,
        )
    }

    fn list_new_subdomains(&self, domain_id: i64) -> StorageResult<Vec<SubdomainRecord>> {
        self.query_subdomains(
            &format!(
                "SELECT {SUBDOMAIN_COLUMNS} FROM subdomains WHERE domain_id = ?1 AND is_new = 1
                 ORDER BY discovered_at DESC, id DESC"
            ),
            domain_id,
        )
    }

    fn mark_seen(&mut self, subdomain_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE subdomains SET is_new = 0 WHERE id = ?1",
            params![subdomain_id],
        )?;
        Ok(())
    }

    fn mark_dns_checked(&mut self, subdomain_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE subdomains SET dns_checked = 1 WHERE id = ?1",
            params![subdomain_id],
        )?;
        Ok(())
    }

    fn record_http_result(
        &mut self,
        subdomain_id: i64,
        status_code: u16,
        page_size: u64,
    ) -> StorageResult<()> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "UPDATE subdomains SET status_code = ?1, page_size = ?2, last_checked = ?3
             WHERE id = ?4",
            params![status_code, page_size as i64, now, subdomain_id],
        )?;
        Ok(())
    }

    fn set_screenshot_path(&mut self, subdomain_id: i64, path: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE subdomains SET screenshot_path = ?1 WHERE id = ?2",
            params![path, subdomain_id],
        )?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_domains(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM domains", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_subdomains(&self, domain_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM subdomains WHERE domain_id = ?1",
            domain_id,
        )
    }

    fn count_new_subdomains(&self, domain_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM subdomains WHERE domain_id = ?1 AND is_new = 1",
            domain_id,
        )
    }

    fn count_dns_checked(&self, domain_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM subdomains WHERE domain_id = ?1 AND dns_checked = 1",
            domain_id,
        )
    }

    fn count_http_checked(&self, domain_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM subdomains WHERE domain_id = ?1 AND status_code IS NOT NULL",
            domain_id,
        )
    }
}

fn domain_from_row(row: &Row<'_>) -> rusqlite::Result<DomainRecord> {
    Ok(DomainRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        scan_interval: row.get::<_, i64>(2)?.max(0) as u64,
        active_scanners: decode_scanners(&row.get::<_, String>(3)?),
        enable_dns_check: row.get(4)?,
        enable_http_check: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
        last_scan: optional_timestamp_column(row, 7)?,
    })
}

fn subdomain_from_row(row: &Row<'_>) -> rusqlite::Result<SubdomainRecord> {
    Ok(SubdomainRecord {
        id: row.get(0)?,
        domain_id: row.get(1)?,
        subdomain: row.get(2)?,
        discovered_at: timestamp_column(row, 3)?,
        last_checked: optional_timestamp_column(row, 4)?,
        status_code: row.get(5)?,
        page_size: row.get::<_, Option<i64>>(6)?.map(|size| size.max(0) as u64),
        dns_checked: row.get(7)?,
        screenshot_path: row.get(8)?,
        is_new: row.get(9)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    parse_timestamp(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|v| {
            parse_timestamp(&v).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}
