/// Capture history kept in chrome.storage.local

use crate::element::ElementInfo;
use serde::{Deserialize, Serialize};

/// chrome.storage.local key holding the history list
pub const HISTORY_KEY: &str = "capture_history";

/// Maximum number of records kept, newest first
pub const HISTORY_LIMIT: usize = 100;

/// One saved screenshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub timestamp: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_info: Option<ElementInfo>,
    pub download_id: i32,
}

/// Ordered capture log, stored as a bare JSON array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct HistoryLog {
    pub records: Vec<HistoryRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog {
            records: Vec::new(),
        }
    }

    /// Insert at the front and drop whatever falls past the limit
    pub fn record(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn find(&self, download_id: i32) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.download_id == download_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
