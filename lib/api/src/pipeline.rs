//! The clustering request pipeline
//!
//! `validate -> load artifacts -> align -> predict -> resolve labels -> persist`
//!
//! Each stage short-circuits on failure. Nothing reaches the sink unless
//! every record has been enriched.

use sdgx_core::{align, predict, EnrichedRecord, LabelTables, Record, SchemeId};
use sdgx_storage::{ArtifactError, ArtifactStore, ResultSink, SinkError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, Instrument};
use uuid::Uuid;

/// Inbound "run clustering" request.
///
/// `scheme_id` is also accepted under its dashboard name `sdg_number`.
#[derive(Debug, Default, Deserialize)]
pub struct ClusteringRequest {
    #[serde(default, alias = "sdg_number")]
    pub scheme_id: Option<Value>,
    #[serde(default)]
    pub data: Option<Vec<Record>>,
}

#[derive(Debug, Serialize)]
pub struct ClusteringResponse {
    pub message: String,
    /// Rows the sink reported as updated
    pub count: usize,
    pub results: Vec<EnrichedRecord>,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("{0}")]
    Alignment(sdgx_core::Error),

    #[error("{0}")]
    Prediction(sdgx_core::Error),

    #[error("Failed to persist results: {0}")]
    Persistence(#[from] SinkError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Artifact(_) => "artifacts",
            PipelineError::Alignment(_) => "alignment",
            PipelineError::Prediction(_) => "prediction",
            PipelineError::Persistence(_) => "persistence",
            PipelineError::Internal(_) => "internal",
        }
    }
}

/// Runs the pipeline against an artifact directory, label tables and a sink
pub struct ClusteringService {
    artifacts: ArtifactStore,
    labels: Arc<LabelTables>,
    sink: Arc<dyn ResultSink>,
}

impl ClusteringService {
    pub fn new(artifacts: ArtifactStore, labels: Arc<LabelTables>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            artifacts,
            labels,
            sink,
        }
    }

    #[inline]
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    #[inline]
    pub fn labels(&self) -> &LabelTables {
        &self.labels
    }

    /// Check that the request names a scheme and carries data
    pub fn validate(request: ClusteringRequest) -> Result<(SchemeId, Vec<Record>), PipelineError> {
        let scheme = request.scheme_id.as_ref().and_then(SchemeId::from_value);
        let data = request.data.filter(|d| !d.is_empty());

        match (scheme, data) {
            (Some(scheme), Some(data)) => Ok((scheme, data)),
            _ => Err(PipelineError::Validation(
                "sdg_number and data are required".to_string(),
            )),
        }
    }

    /// Load, align, predict and label, without persisting.
    ///
    /// Blocking: reads the artifact files.
    pub fn enrich(&self, scheme: SchemeId, records: Vec<Record>) -> Result<Vec<EnrichedRecord>, PipelineError> {
        enrich(&self.artifacts, &self.labels, scheme, records)
    }

    /// Run the whole pipeline for one request
    pub async fn run(&self, request: ClusteringRequest) -> Result<ClusteringResponse, PipelineError> {
        let (scheme, records) = Self::validate(request)?;
        let span = tracing::info_span!("run_clustering", request_id = %Uuid::new_v4(), scheme = %scheme);

        async move {
            let artifacts = self.artifacts.clone();
            let labels = self.labels.clone();
            let span = tracing::Span::current();
            let enriched = tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                enrich(&artifacts, &labels, scheme, records)
            })
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;

            let count = self.sink.persist(scheme, &enriched).await?;
            info!(rows = enriched.len(), updated = count, sink = self.sink.name(), "clustering complete");

            Ok(ClusteringResponse {
                message: format!("Clustering succeeded for SDG {}", scheme),
                count,
                results: enriched,
            })
        }
        .instrument(span)
        .await
    }
}

fn enrich(
    store: &ArtifactStore,
    labels: &LabelTables,
    scheme: SchemeId,
    records: Vec<Record>,
) -> Result<Vec<EnrichedRecord>, PipelineError> {
    let artifacts = store.load(scheme)?;

    let matrix = align(&records, &artifacts.spec).map_err(PipelineError::Alignment)?;
    let clusters = predict(&artifacts.model, &matrix, artifacts.spec.categorical())
        .map_err(PipelineError::Prediction)?;

    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .zip(clusters)
        .map(|(record, cluster)| {
            let label = labels.resolve(scheme, cluster).map(str::to_string);
            EnrichedRecord::new(record, cluster, label)
        })
        .collect();

    let unlabelled = enriched.iter().filter(|r| r.label.is_none()).count();
    if unlabelled > 0 {
        tracing::warn!(unlabelled, "cluster ids without a configured label");
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdgx_storage::MemorySink;
    use serde_json::json;
    use std::path::Path;

    fn request(value: Value) -> ClusteringRequest {
        serde_json::from_value(value).unwrap()
    }

    fn write_scheme(dir: &Path, scheme: u32, model: &str, features: &str, categorical: &str) {
        std::fs::write(dir.join(format!("model_sdg{}.json", scheme)), model).unwrap();
        std::fs::write(dir.join(format!("features_sdg{}.json", scheme)), features).unwrap();
        std::fs::write(dir.join(format!("cat_idx_sdg{}.json", scheme)), categorical).unwrap();
    }

    fn service(dir: &Path) -> (ClusteringService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let service = ClusteringService::new(
            ArtifactStore::new(dir),
            Arc::new(LabelTables::builtin()),
            sink.clone(),
        );
        (service, sink)
    }

    const KPROTOTYPES: &str = r#"{
        "algorithm": "kprototypes",
        "gamma": 1.0,
        "numeric_centroids": [[1.0], [2.0]],
        "categorical_centroids": [["a"], ["b"]]
    }"#;

    #[test]
    fn test_validate_requires_scheme_and_data() {
        assert!(ClusteringService::validate(request(json!({"data": [{"x": 1}]}))).is_err());
        assert!(ClusteringService::validate(request(json!({"sdg_number": 1}))).is_err());
        assert!(ClusteringService::validate(request(json!({"sdg_number": 1, "data": []}))).is_err());
        assert!(ClusteringService::validate(request(json!({"sdg_number": 0, "data": [{}]}))).is_err());

        let (scheme, data) =
            ClusteringService::validate(request(json!({"scheme_id": "3", "data": [{"x": 1}]}))).unwrap();
        assert_eq!(scheme.get(), 3);
        assert_eq!(data.len(), 1);
    }

    #[tokio::test]
    async fn test_run_enriches_in_order_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme(dir.path(), 1, KPROTOTYPES, r#"["x", "cat"]"#, "[1]");
        let (service, sink) = service(dir.path());

        let response = service
            .run(request(json!({
                "sdg_number": 1,
                "data": [{"x": 1, "cat": "a"}, {"x": 2, "cat": "b"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.message, "Clustering succeeded for SDG 1");
        assert_eq!(response.count, 2);
        assert_eq!(response.results[0].cluster, 0);
        assert_eq!(response.results[0].label.as_deref(), Some("Desa Prioritas Penanganan Kemiskinan"));
        assert_eq!(response.results[1].cluster, 1);
        assert_eq!(response.results[1].label.as_deref(), Some("Desa dengan Kemiskinan Terdata Rendah"));
        assert_eq!(response.results[1].get("x"), Some(&json!(2)));

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1, response.results);
    }

    #[tokio::test]
    async fn test_missing_model_stops_before_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let (service, sink) = service(dir.path());

        let err = service
            .run(request(json!({"sdg_number": 8, "data": [{"r1403a": 1}]})))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "artifacts");
        assert!(err.to_string().contains("model_sdg8.json"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_missing_column_names_column() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme(dir.path(), 1, KPROTOTYPES, r#"["x", "cat"]"#, "[1]");
        let (service, sink) = service(dir.path());

        let err = service
            .run(request(json!({"sdg_number": 1, "data": [{"x": 1}]})))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "alignment");
        assert!(err.to_string().contains("'cat'"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_prediction_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // Three centroid columns against a two-column spec
        write_scheme(
            dir.path(),
            4,
            r#"{"algorithm": "kmeans", "cluster_centers": [[0.0, 0.0, 0.0]]}"#,
            r#"["a", "b"]"#,
            "[]",
        );
        let (service, sink) = service(dir.path());

        let err = service
            .run(request(json!({"sdg_number": 4, "data": [{"a": 1, "b": 2}]})))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "prediction");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_enrich_unnamed_cluster_has_no_label() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme(
            dir.path(),
            1,
            r#"{"algorithm": "kmeans", "cluster_centers": [[0.0], [5.0], [10.0]]}"#,
            r#"["r710"]"#,
            "[]",
        );
        let (service, _) = service(dir.path());
        let records = vec![json!({"r710": 11}).as_object().cloned().unwrap()];

        let enriched = service.enrich(SchemeId::new(1).unwrap(), records).unwrap();
        assert_eq!(enriched[0].cluster, 2);
        assert_eq!(enriched[0].label, None);
    }
}
