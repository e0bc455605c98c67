//! Startup bulk load
//!
//! Reads a single PRes message from `data.init.file` and feeds it through the
//! ingest path. Nothing in here can stop the process: every failure is
//! logged and the directory keeps serving whatever it already holds.

use crate::config::DataInitConfig;
use crate::directory::RangeDirectory;
use crate::error::Result;
use crate::types::{BulkImportResponse, PResMessage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

pub struct DataInitializer<'d> {
    config: &'d DataInitConfig,
    dir: &'d RangeDirectory,
}

impl<'d> DataInitializer<'d> {
    pub fn new(config: &'d DataInitConfig, dir: &'d RangeDirectory) -> Self {
        Self { config, dir }
    }

    /// Run the load if enabled. Returns the ingest summary when a message
    /// was actually processed.
    pub fn run(&self) -> Option<BulkImportResponse> {
        if !self.config.enabled {
            info!("Data initialization is disabled, set data.init.enabled to enable it");
            return None;
        }
        if self.config.clear_existing {
            info!("data.init.clear-existing is set but existing ranges are never cleared");
        }

        let Some(file) = self.config.file.as_deref() else {
            warn!("Data initialization enabled without data.init.file");
            return None;
        };
        let path = resolve_path(file);
        info!(file = %path.display(), "Starting batch data initialization");

        let message = match load_pres(&path) {
            Ok(Some(message)) => message,
            Ok(None) => {
                warn!(file = %path.display(), "No data found to initialize");
                return None;
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Failed to load PRes message");
                return None;
            }
        };

        let started = Instant::now();
        let response = self.dir.ranges().process_pres(&message);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            total = response.total_processed,
            success = response.success_count,
            errors = response.error_count,
            "Batch data initialization completed"
        );
        for line in &response.errors {
            warn!("  - {}", line);
        }
        Some(response)
    }
}

/// `file:` URIs and plain paths both resolve to a filesystem path.
pub fn resolve_path(uri: &str) -> PathBuf {
    let trimmed = uri.trim();
    let path = trimmed.strip_prefix("file://").or_else(|| trimmed.strip_prefix("file:"));
    PathBuf::from(path.unwrap_or(trimmed))
}

/// Read one PRes message. A missing file is `Ok(None)`.
pub fn load_pres(path: &Path) -> Result<Option<PResMessage>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read(path)?;
    let message: PResMessage = serde_json::from_slice(&raw)?;
    info!(ranges = message.card_range_data.len(), "Loaded PRes message from file");
    Ok(Some(message))
}
