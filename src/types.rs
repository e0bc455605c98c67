use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::index::Interval;

/// Column widths of the `card_range` table.
pub const ACTION_IND_MAX_LEN: usize = 1;
pub const PROTOCOL_VERSION_MAX_LEN: usize = 20;
pub const METHOD_URL_MAX_LEN: usize = 2048;

/// A persisted card range: one row of the catalog.
///
/// `id` is `None` until the store assigns one on insert.
#[derive(Clone, Debug, PartialEq)]
pub struct CardRange {
    pub id: Option<u64>,
    /// Inclusive lower bound
    pub start_range: u64,
    /// Inclusive upper bound
    pub end_range: u64,
    pub action_ind: Option<String>,
    pub acs_start_protocol_version: Option<String>,
    pub acs_end_protocol_version: Option<String>,
    pub three_ds_method_url: Option<String>,
    pub acs_info_ind: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardRange {
    /// Build an unsaved record from a wire DTO, stamping both timestamps with `now`.
    pub fn from_data(data: &CardRangeData, now: DateTime<Utc>) -> Result<Self, StoreError> {
        let start_range = required_bound("start range", data.start_range)?;
        let end_range = required_bound("end range", data.end_range)?;
        Ok(Self {
            id: None,
            start_range,
            end_range,
            action_ind: data.action_ind.clone(),
            acs_start_protocol_version: data.acs_start_protocol_version.clone(),
            acs_end_protocol_version: data.acs_end_protocol_version.clone(),
            three_ds_method_url: data.three_ds_method_url.clone(),
            acs_info_ind: data.acs_info_ind.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn contains(&self, pan: u64) -> bool {
        pan >= self.start_range && pan <= self.end_range
    }

    /// Row constraints every store enforces on insert.
    pub fn check_constraints(&self) -> Result<(), StoreError> {
        for (name, bound) in [("start_range", self.start_range), ("end_range", self.end_range)] {
            if i64::try_from(bound).is_err() {
                return Err(StoreError::Integrity(format!(
                    "{} {} does not fit a signed 64-bit column",
                    name, bound
                )));
            }
        }
        if self.start_range > self.end_range {
            return Err(StoreError::Integrity(format!(
                "start range {} is greater than end range {}",
                self.start_range, self.end_range
            )));
        }
        check_width("action_ind", self.action_ind.as_deref(), ACTION_IND_MAX_LEN)?;
        check_width(
            "acs_start_protocol_version",
            self.acs_start_protocol_version.as_deref(),
            PROTOCOL_VERSION_MAX_LEN,
        )?;
        check_width(
            "acs_end_protocol_version",
            self.acs_end_protocol_version.as_deref(),
            PROTOCOL_VERSION_MAX_LEN,
        )?;
        check_width(
            "three_ds_method_url",
            self.three_ds_method_url.as_deref(),
            METHOD_URL_MAX_LEN,
        )?;
        Ok(())
    }

    /// Entity → wire DTO. Ids and timestamps are not part of the wire format.
    /// Bounds are exact for any row that passed [`check_constraints`](Self::check_constraints).
    pub fn to_data(&self) -> CardRangeData {
        CardRangeData {
            start_range: i64::try_from(self.start_range).ok(),
            end_range: i64::try_from(self.end_range).ok(),
            action_ind: self.action_ind.clone(),
            acs_end_protocol_version: self.acs_end_protocol_version.clone(),
            three_ds_method_url: self.three_ds_method_url.clone(),
            acs_start_protocol_version: self.acs_start_protocol_version.clone(),
            acs_info_ind: self.acs_info_ind.clone(),
        }
    }
}

impl Interval for CardRange {
    fn interval_start(&self) -> Option<u64> {
        Some(self.start_range)
    }

    fn interval_end(&self) -> Option<u64> {
        Some(self.end_range)
    }
}

fn required_bound(name: &str, value: Option<i64>) -> Result<u64, StoreError> {
    let value = value.ok_or_else(|| StoreError::Integrity(format!("{} cannot be null", name)))?;
    u64::try_from(value)
        .map_err(|_| StoreError::Integrity(format!("{} must be non-negative, got {}", name, value)))
}

fn check_width(column: &str, value: Option<&str>, max: usize) -> Result<(), StoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(StoreError::Integrity(format!(
            "value too long for column {} (max {} chars, got {})",
            column,
            max,
            v.chars().count()
        ))),
        _ => Ok(()),
    }
}

/// Card range as carried in PRes messages and lookup responses.
///
/// Bounds are signed and optional on the wire; validation happens when the
/// DTO is turned into a [`CardRange`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRangeData {
    #[serde(rename = "startRange")]
    pub start_range: Option<i64>,
    #[serde(rename = "endRange")]
    pub end_range: Option<i64>,
    #[serde(rename = "actionInd")]
    pub action_ind: Option<String>,
    #[serde(rename = "acsEndProtocolVersion")]
    pub acs_end_protocol_version: Option<String>,
    #[serde(rename = "threeDSMethodURL")]
    pub three_ds_method_url: Option<String>,
    #[serde(rename = "acsStartProtocolVersion")]
    pub acs_start_protocol_version: Option<String>,
    #[serde(rename = "acsInfoInd")]
    pub acs_info_ind: Option<Vec<String>>,
}

impl CardRangeData {
    /// Convenience constructor for a bare `[start, end]` range.
    pub fn new(start_range: i64, end_range: i64) -> Self {
        Self {
            start_range: Some(start_range),
            end_range: Some(end_range),
            ..Default::default()
        }
    }

    /// `"{start}-{end}"`, with `null` for a missing bound.
    pub fn bounds_label(&self) -> String {
        fn show(v: Option<i64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string())
        }
        format!("{}-{}", show(self.start_range), show(self.end_range))
    }
}

impl Interval for CardRangeData {
    fn interval_start(&self) -> Option<u64> {
        self.start_range.and_then(|v| u64::try_from(v).ok())
    }

    fn interval_end(&self) -> Option<u64> {
        self.end_range.and_then(|v| u64::try_from(v).ok())
    }
}

/// Bulk publication from the directory server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PResMessage {
    #[serde(rename = "serialNum")]
    pub serial_num: Option<String>,
    #[serde(rename = "messageType")]
    pub message_type: Option<String>,
    #[serde(rename = "dsTransID")]
    pub ds_trans_id: Option<String>,
    #[serde(rename = "cardRangeData")]
    pub card_range_data: Vec<CardRangeData>,
}

/// Outcome of one bulk ingest.
///
/// `total_processed == success_count + error_count` and
/// `errors.len() == error_count`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportResponse {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

/// Row shape of the `cached_record` table.
///
/// Reserved for tracking which PANs have cache entries so a range update can
/// invalidate them. Nothing writes it yet.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedRecord {
    pub id: Option<u64>,
    pub pan: u64,
    pub start_range: u64,
    pub end_range: u64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
