//! # sdgx
//!
//! Clustering inference service for SDG village survey data.
//!
//! Each scheme (SDG 1-17) has its own trained model, feature list and
//! categorical column positions. A request names a scheme and carries a
//! batch of village records; sdgx aligns the records to the scheme's
//! features, calls the model under the convention it supports, attaches a
//! human-readable label to every cluster id and persists the result.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! sdgx --models-dir ./models --http-port 9000 --sink file --sink-dir ./data
//! ```
//!
//! ```bash
//! curl -X POST localhost:9000/run-clustering \
//!   -H 'content-type: application/json' \
//!   -d '{"sdg_number": 1, "data": [{"nama_desa": "WATES", "r710": 40}]}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use sdgx::prelude::*;
//!
//! let store = ArtifactStore::new("./models");
//! let scheme = SchemeId::new(1).unwrap();
//! let artifacts = store.load(scheme).unwrap();
//!
//! let records: Vec<Record> = vec![
//!     serde_json::json!({"nama_desa": "WATES", "r710": 40}).as_object().unwrap().clone(),
//! ];
//! let matrix = align(&records, &artifacts.spec).unwrap();
//! let clusters = predict(&artifacts.model, &matrix, artifacts.spec.categorical()).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `sdgx-core` - records, feature alignment, models, dispatch and labels
//! - `sdgx-storage` - artifact loading and result sinks
//! - `sdgx-api` - the clustering pipeline and its REST surface

// Re-export core types
pub use sdgx_core::{
    align, predict,
    CategoricalIndex, ClusterId, ClusterModel, EnrichedRecord, FeatureMatrix, FeatureSpec,
    KMeans, KModes, KPrototypes, LabelTables, ModelConvention, Record, SchemeId, TaggedModel,
    Error, Result,
};

// Re-export storage
pub use sdgx_storage::{
    ArtifactError, ArtifactStore, JsonFileSink, MemorySink, NoopSink, PostgrestSink, ResultSink,
};

// Re-export API
pub use sdgx_api::{ClusteringRequest, ClusteringResponse, ClusteringService, PipelineError, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        align, predict,
        ArtifactStore, ClusterModel, ClusteringService, EnrichedRecord, FeatureSpec,
        LabelTables, Record, ResultSink, SchemeId, TaggedModel,
        Error, Result,
    };
}
