use crate::directory::RangeDirectory;
use crate::error::Result;
use crate::index::RebuildReport;
use crate::types::{BulkImportResponse, CardRange, CardRangeData, PResMessage};
use chrono::Utc;
use tracing::{error, info, warn};

/// Write path: bulk ingest into the store and index refresh.
pub struct Ranges<'d>(&'d RangeDirectory);

impl<'d> Ranges<'d> {
    pub(crate) fn new(dir: &'d RangeDirectory) -> Self {
        Self(dir)
    }

    /// Persist every range of a PRes message, one insert per item.
    ///
    /// A failing item is recorded in `errors` and the batch carries on. When
    /// `lookup.rebuild-after-ingest` is set and anything was stored, the
    /// index is refreshed from the store afterwards; a refresh failure is
    /// logged and does not change the summary.
    pub fn process_pres(&self, message: &PResMessage) -> BulkImportResponse {
        let total = message.card_range_data.len();
        info!(
            total,
            serial_num = message.serial_num.as_deref().unwrap_or(""),
            ds_trans_id = message.ds_trans_id.as_deref().unwrap_or(""),
            "Processing PRes message"
        );

        let mut success_count = 0usize;
        let mut errors = Vec::new();

        for (i, data) in message.card_range_data.iter().enumerate() {
            match self.insert_one(data) {
                Ok(_) => success_count += 1,
                Err(message) => {
                    let line = format!(
                        "Error processing range {} ({}): {}",
                        i + 1,
                        data.bounds_label(),
                        message
                    );
                    warn!("{}", line);
                    errors.push(line);
                }
            }
        }

        let response = BulkImportResponse {
            total_processed: total,
            success_count,
            error_count: total - success_count,
            errors,
            processed_at: Utc::now(),
        };
        info!(
            total = response.total_processed,
            success = response.success_count,
            errors = response.error_count,
            "PRes message processed"
        );

        if self.0.lookup_config().rebuild_after_ingest && success_count > 0 {
            if let Err(e) = self.rebuild_index() {
                error!(error = %e, "Index refresh after ingest failed");
            }
        }
        response
    }

    fn insert_one(&self, data: &CardRangeData) -> std::result::Result<u64, String> {
        let range = CardRange::from_data(data, Utc::now()).map_err(|e| e.to_string())?;
        self.0.store().insert(&range).map_err(|e| e.to_string())
    }

    /// Replace the published index with one built from the whole store.
    ///
    /// The store is scanned under the index rebuild lock, so concurrent
    /// refreshes publish in scan order.
    pub fn rebuild_index(&self) -> Result<RebuildReport> {
        let store = self.0.store();
        self.0.index().rebuild_from(|| Ok(store.scan_all()?))
    }

    /// Number of ranges in the store.
    pub fn count(&self) -> Result<usize> {
        Ok(self.0.store().count()?)
    }
}
