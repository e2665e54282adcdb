//! PostgREST sink for the dashboard's Supabase tables.
//!
//! Each scheme `n` maps to table `sdgs_{n}`; rows are matched on a key
//! column (the village name by default) and only the cluster columns are
//! updated.

use async_trait::async_trait;
use sdgx_core::{value_to_text, EnrichedRecord, SchemeId, CLUSTER_COLUMN, LABEL_COLUMN};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::SinkError;
use crate::sink::ResultSink;

/// Default column identifying a village row
pub const DEFAULT_KEY_COLUMN: &str = "nama_desa";

pub struct PostgrestSink {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    key_column: String,
}

impl PostgrestSink {
    /// Create a sink for the given project URL.
    ///
    /// `base_url` should be like `https://xyz.supabase.co` (no trailing slash).
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            key_column: DEFAULT_KEY_COLUMN.to_string(),
        }
    }

    /// Match rows on a different column
    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }

    #[inline]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Table endpoint for a scheme
    pub fn endpoint(&self, scheme: SchemeId) -> String {
        format!("{}/rest/v1/sdgs_{}", self.base_url, scheme)
    }

    /// PostgREST equality filter for a record, if it carries the key column
    fn key_filter(&self, record: &EnrichedRecord) -> Option<String> {
        match record.get(&self.key_column)? {
            Value::Null => None,
            value => Some(format!("eq.{}", value_to_text(value))),
        }
    }

    async fn update_row(
        &self,
        url: &str,
        filter: &str,
        record: &EnrichedRecord,
    ) -> Result<usize, SinkError> {
        let body = serde_json::json!({
            CLUSTER_COLUMN: record.cluster,
            LABEL_COLUMN: record.label,
        });

        let resp = self
            .client
            .patch(url)
            .query(&[(self.key_column.as_str(), filter)])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SinkError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let updated: Vec<Value> = resp.json().await?;
        Ok(updated.len())
    }
}

#[async_trait]
impl ResultSink for PostgrestSink {
    async fn persist(&self, scheme: SchemeId, records: &[EnrichedRecord]) -> Result<usize, SinkError> {
        let url = self.endpoint(scheme);
        info!(url = %url, rows = records.len(), "updating cluster columns");

        let mut updated = 0;
        for (row, record) in records.iter().enumerate() {
            let Some(filter) = self.key_filter(record) else {
                warn!(row, key = %self.key_column, "record has no key value, skipping");
                continue;
            };
            updated += self.update_row(&url, &filter, record).await?;
        }

        info!(scheme = %scheme, updated, "update complete");
        Ok(updated)
    }

    fn name(&self) -> &str {
        "postgrest"
    }
}
