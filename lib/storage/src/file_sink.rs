//! JSON file sink
//!
//! Writes the latest result of each scheme to `sdgs_{n}.json`, replacing
//! the previous file atomically.

use async_trait::async_trait;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use sdgx_core::{EnrichedRecord, SchemeId};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SinkError;
use crate::sink::ResultSink;

/// On-disk layout of a persisted result
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedResult {
    pub scheme: SchemeId,
    pub persisted_at: DateTime<Utc>,
    pub records: Vec<EnrichedRecord>,
}

pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File holding a scheme's latest result
    pub fn path_for(&self, scheme: SchemeId) -> PathBuf {
        self.dir.join(format!("sdgs_{}.json", scheme))
    }

    /// Read back a scheme's latest result, if any
    pub fn read(&self, scheme: SchemeId) -> Result<Option<PersistedResult>, SinkError> {
        let path = self.path_for(scheme);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn write(&self, scheme: SchemeId, records: &[EnrichedRecord]) -> Result<(), SinkError> {
        let result = PersistedResult {
            scheme,
            persisted_at: Utc::now(),
            records: records.to_vec(),
        };
        let data = serde_json::to_vec_pretty(&result)?;

        AtomicFile::new(self.path_for(scheme), OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| SinkError::Other(format!("atomic write failed: {}", e)))
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn persist(&self, scheme: SchemeId, records: &[EnrichedRecord]) -> Result<usize, SinkError> {
        self.write(scheme, records)?;
        info!(scheme = %scheme, rows = records.len(), path = ?self.path_for(scheme), "persisted results");
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "file"
    }
}
