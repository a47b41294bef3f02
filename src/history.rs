// 📜 History Store - append-only log of calculations
//
// Backed by one JSON file holding an array of records. Single writer: every
// append is a full read → push → write cycle, so two concurrent sessions can
// lose each other's records (last write wins).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default history location, relative to the working directory
pub const DEFAULT_HISTORY_FILE: &str = "calculation_history.json";

// ============================================================================
// RECORD
// ============================================================================

/// One persisted calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// As entered, whitespace included
    pub name: String,
    pub result: u32,
    /// RFC 3339, UTC
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read history file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write history file {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Existing content is not a record list. The file is left untouched.
    #[error("History file {} is corrupt: {}", .path.display(), .source)]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode history: {0}")]
    Encode(#[source] serde_json::Error),
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Durable, append-only sequence of records in insertion order.
pub trait HistoryStore {
    fn append(
        &mut self,
        name: &str,
        result: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoryRecord, StorageError>;

    /// All records, oldest first. Empty if nothing was ever written.
    fn list(&self) -> Result<Vec<HistoryRecord>, StorageError>;
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// File-backed store. A corrupt file fails both `list` and `append`; it is
/// never reset or overwritten.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // A touched-but-never-written file counts as empty
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write through a sibling temp file + rename so a failed write never
    /// leaves a truncated history behind.
    fn save(&self, records: &[HistoryRecord]) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let json = serde_json::to_vec_pretty(records).map_err(StorageError::Encode)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            write_err(source)
        })
    }
}

impl HistoryStore for JsonFileStore {
    fn append(
        &mut self,
        name: &str,
        result: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoryRecord, StorageError> {
        let mut records = self.load()?;
        let record = HistoryRecord {
            name: name.to_string(),
            result,
            timestamp,
        };
        records.push(record.clone());
        self.save(&records)?;

        info!(
            path = %self.path.display(),
            total = records.len(),
            "appended history record"
        );
        Ok(record)
    }

    fn list(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let records = self.load()?;
        debug!(path = %self.path.display(), count = records.len(), "loaded history");
        Ok(records)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<HistoryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        MemoryStore { records }
    }
}

impl HistoryStore for MemoryStore {
    fn append(
        &mut self,
        name: &str,
        result: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoryRecord, StorageError> {
        let record = HistoryRecord {
            name: name.to_string(),
            result,
            timestamp,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        Ok(self.records.clone())
    }
}

// ============================================================================
// DISPLAY HELPERS
// ============================================================================

/// History is displayed newest first.
pub fn newest_first(mut records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
    records.reverse();
    records
}

/// Most recent record whose name matches, ignoring case and outer whitespace.
pub fn find_by_name<'a>(records: &'a [HistoryRecord], name: &str) -> Option<&'a HistoryRecord> {
    let wanted = name.trim().to_lowercase();
    records
        .iter()
        .rev()
        .find(|r| r.name.trim().to_lowercase() == wanted)
}

/// Distinct results present in `records`, ascending
pub fn distinct_results(records: &[HistoryRecord]) -> Vec<u32> {
    records
        .iter()
        .map(|r| r.result)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keep only records whose result is in the selected set. An empty selection
/// keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    values: BTreeSet<u32>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I: IntoIterator<Item = u32>>(values: I) -> Self {
        HistoryFilter {
            values: values.into_iter().collect(),
        }
    }

    pub fn only(value: u32) -> Self {
        Self::from_values([value])
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }

    pub fn matches(&self, record: &HistoryRecord) -> bool {
        self.values.is_empty() || self.values.contains(&record.result)
    }

    pub fn apply(&self, records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
