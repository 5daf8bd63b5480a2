//! Full-history JSON backup with a small envelope around the records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::models::GameRecord;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupMetadata {
    pub scope: String,
    pub record_count: usize,
    pub app_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    pub metadata: BackupMetadata,
    pub records: Vec<GameRecord>,
}

impl Backup {
    pub fn new(scope: &str, records: Vec<GameRecord>) -> Self {
        Self {
            version: BACKUP_VERSION,
            export_date: Utc::now(),
            metadata: BackupMetadata {
                scope: scope.to_string(),
                record_count: records.len(),
                app_version: crate::VERSION.to_string(),
            },
            records,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }
}
