//! Per-user record store backed by one CSV file.
//!
//! The whole table is read into memory at session start and written back
//! whole on upload. Uploads are concatenated onto the existing table: no
//! deduplication, no validation against existing protocol ids, matching the
//! append-only contract of the accumulated spreadsheet. The write is a plain
//! overwrite with no partial-write safety; see DESIGN.md for the flagged
//! corruption window.

use crate::error::Result;
use crate::schema::{read_records, write_records};
use crate::types::TaskRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Handle on one user's accumulated record file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full accumulated table. A store file that does not exist
    /// yet is an empty table, not an error.
    pub fn load(&self) -> Result<Vec<TaskRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no store file yet, starting empty");
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)?;
        let records = read_records(file)?;
        debug!(path = %self.path.display(), rows = records.len(), "loaded record store");
        Ok(records)
    }

    /// Overwrite the store with `records`.
    pub fn save(&self, records: &[TaskRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        write_records(file, records)?;
        Ok(())
    }

    /// Concatenate an uploaded batch onto the accumulated table and persist
    /// the result. Returns the new total row count.
    pub fn append(&self, uploaded: Vec<TaskRecord>) -> Result<usize> {
        let mut records = self.load()?;
        let added = uploaded.len();
        records.extend(uploaded);
        self.save(&records)?;
        info!(
            path = %self.path.display(),
            added,
            total = records.len(),
            "appended upload to record store"
        );
        Ok(records.len())
    }
}
