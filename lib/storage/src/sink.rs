//! Result sinks
//!
//! A sink receives the fully enriched dataset of one request and reports
//! how many rows it updated. Sinks are called once per request, after
//! every record has been labelled.

use async_trait::async_trait;
use parking_lot::Mutex;
use sdgx_core::{EnrichedRecord, SchemeId};

use crate::error::SinkError;

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the enriched records of one scheme, returning the number of
    /// rows updated
    async fn persist(&self, scheme: SchemeId, records: &[EnrichedRecord]) -> Result<usize, SinkError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Discards results
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl ResultSink for NoopSink {
    async fn persist(&self, _scheme: SchemeId, _records: &[EnrichedRecord]) -> Result<usize, SinkError> {
        Ok(0)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Keeps every persisted batch in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<(SchemeId, Vec<EnrichedRecord>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All batches persisted so far, oldest first
    pub fn batches(&self) -> Vec<(SchemeId, Vec<EnrichedRecord>)> {
        self.batches.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn persist(&self, scheme: SchemeId, records: &[EnrichedRecord]) -> Result<usize, SinkError> {
        self.batches.lock().push((scheme, records.to_vec()));
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
