//! SQLite Range Store
//!
//! Durable catalog in a single SQLite file. Schema:
//! - `card_range` with a unique composite index on `(start_range, end_range)`
//! - `cached_record`, reserved for cache invalidation tracking (never written)
//!
//! Bounds are stored as INTEGER (i64); ranges above `i64::MAX` are rejected.

use super::RangeStore;
use crate::error::StoreError;
use crate::types::CardRange;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS card_range (
    id                         INTEGER PRIMARY KEY AUTOINCREMENT,
    start_range                INTEGER NOT NULL,
    end_range                  INTEGER NOT NULL,
    action_ind                 VARCHAR(1),
    acs_end_protocol_version   VARCHAR(20),
    three_ds_method_url        VARCHAR(2048),
    acs_start_protocol_version VARCHAR(20),
    acs_info                   TEXT,
    created_at                 TEXT NOT NULL,
    updated_at                 TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_range_composite
    ON card_range (start_range, end_range);

CREATE TABLE IF NOT EXISTS cached_record (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    pan         INTEGER NOT NULL,
    start_range INTEGER NOT NULL,
    end_range   INTEGER NOT NULL,
    is_valid    INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str = "id, start_range, end_range, action_ind, acs_end_protocol_version, \
     three_ds_method_url, acs_start_protocol_version, acs_info, created_at, updated_at";

pub struct SqliteRangeStore {
    conn: Mutex<Connection>,
}

impl SqliteRangeStore {
    /// Open (or create) the catalog at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Throwaway catalog, gone when dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn to_sql_bound(name: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Integrity(format!("{} {} does not fit an INTEGER column", name, value)))
}

/// Only the composite index violation is a duplicate; NOT NULL and CHECK
/// failures are integrity errors.
fn insert_error(e: rusqlite::Error, range: &CardRange) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Unique(format!(
                "range {}-{} already exists",
                range.start_range, range.end_range
            ))
        }
        rusqlite::Error::SqliteFailure(err, detail) if err.code == ErrorCode::ConstraintViolation => {
            StoreError::Integrity(detail.unwrap_or_else(|| err.to_string()))
        }
        e => e.into(),
    }
}

struct RawRow {
    id: i64,
    start_range: i64,
    end_range: i64,
    action_ind: Option<String>,
    acs_end_protocol_version: Option<String>,
    three_ds_method_url: Option<String>,
    acs_start_protocol_version: Option<String>,
    acs_info: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_range: row.get(1)?,
            end_range: row.get(2)?,
            action_ind: row.get(3)?,
            acs_end_protocol_version: row.get(4)?,
            three_ds_method_url: row.get(5)?,
            acs_start_protocol_version: row.get(6)?,
            acs_info: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_range(self) -> Result<CardRange, StoreError> {
        let corrupt = |what: &str| StoreError::Backend(format!("row {}: bad {}", self.id, what));
        let acs_info_ind = match &self.acs_info {
            Some(raw) => Some(serde_json::from_str(raw).map_err(|_| corrupt("acs_info"))?),
            None => None,
        };
        Ok(CardRange {
            id: Some(u64::try_from(self.id).map_err(|_| corrupt("id"))?),
            start_range: u64::try_from(self.start_range).map_err(|_| corrupt("start_range"))?,
            end_range: u64::try_from(self.end_range).map_err(|_| corrupt("end_range"))?,
            created_at: parse_timestamp(&self.created_at).ok_or_else(|| corrupt("created_at"))?,
            updated_at: parse_timestamp(&self.updated_at).ok_or_else(|| corrupt("updated_at"))?,
            action_ind: self.action_ind,
            acs_start_protocol_version: self.acs_start_protocol_version,
            acs_end_protocol_version: self.acs_end_protocol_version,
            three_ds_method_url: self.three_ds_method_url,
            acs_info_ind,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl RangeStore for SqliteRangeStore {
    fn insert(&self, range: &CardRange) -> Result<u64, StoreError> {
        range.check_constraints()?;
        let start = to_sql_bound("start range", range.start_range)?;
        let end = to_sql_bound("end range", range.end_range)?;
        let acs_info = match &range.acs_info_ind {
            Some(list) => Some(
                serde_json::to_string(list)
                    .map_err(|e| StoreError::Integrity(format!("acs_info: {}", e)))?,
            ),
            None => None,
        };

        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO card_range (start_range, end_range, action_ind, acs_end_protocol_version, \
             three_ds_method_url, acs_start_protocol_version, acs_info, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                start,
                end,
                range.action_ind,
                range.acs_end_protocol_version,
                range.three_ds_method_url,
                range.acs_start_protocol_version,
                acs_info,
                range.created_at.to_rfc3339(),
                range.updated_at.to_rfc3339(),
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid() as u64),
            Err(e) => Err(insert_error(e, range)),
        }
    }

    fn find_containing(&self, pan: u64) -> Result<Option<CardRange>, StoreError> {
        let Ok(pan) = i64::try_from(pan) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM card_range WHERE start_range <= ?1 ORDER BY start_range DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let raw = {
            let conn = self.conn.lock();
            conn.query_row(&sql, params![pan], RawRow::read).optional()?
        };
        match raw {
            Some(row) if row.end_range >= pan => Ok(Some(row.into_range()?)),
            _ => Ok(None),
        }
    }

    fn scan_all(&self) -> Result<Vec<CardRange>, StoreError> {
        let sql = format!("SELECT {} FROM card_range ORDER BY start_range", SELECT_COLUMNS);
        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], RawRow::read)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(RawRow::into_range).collect()
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM card_range", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
