//! Data models for engine results
//!
//! These mirror the JSON documents the engine writes to stdout when run
//! with `--json`. They are produced by the engine only; the client never
//! constructs them outside of tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of any write (put, patch, delete, revert)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PutResult {
    /// Repository snapshot produced by the write
    pub commit: String,
    pub tx_hash: String,
    pub tx_id: String,
}

/// A document value with the metadata of the transaction that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetResult {
    pub doc: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
}

/// One transaction in a document's hash-linked history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub tx_hash: String,
    pub tx_id: String,
    /// Hash of the previous transaction; absent for the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<String>,
    /// Unix nanoseconds
    pub timestamp: i64,
    pub op: String,
}

impl LogEntry {
    /// Timestamp as a UTC date-time
    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp)
    }

    /// Whether this is the first transaction of its chain
    pub fn is_root(&self) -> bool {
        self.parent_hash.as_deref().map_or(true, str::is_empty)
    }
}

/// Envelope written by `doc log`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogOutput {
    #[serde(default)]
    pub entries: Option<Vec<LogEntry>>,
}

/// Report of one index synchronization pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSyncResult {
    /// The local index was rebuilt from scratch instead of advanced
    pub reset: bool,
    pub fetched: bool,
    pub commits: u64,
    pub txs_applied: u64,
    pub docs_upserted: u64,
    pub docs_deleted: u64,
    pub collections: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<String>,
}

impl IndexSyncResult {
    /// Whether the pass changed the index at all
    pub fn has_changes(&self) -> bool {
        self.commits > 0 || self.txs_applied > 0 || self.docs_upserted > 0 || self.docs_deleted > 0
    }
}
