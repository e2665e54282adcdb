//! # sdgx Core
//!
//! Core library for the sdgx clustering service.
//!
//! This crate holds everything between raw survey records and labelled
//! cluster assignments:
//!
//! - [`FeatureSpec`] - ordered feature names plus categorical positions
//! - [`align()`] - projects records onto a feature spec as a typed [`FeatureMatrix`]
//! - [`ClusterModel`] - the trained model trait, with [`KMeans`], [`KPrototypes`] and [`KModes`]
//! - [`TaggedModel`] / [`predict()`] - convention-aware model dispatch
//! - [`LabelTables`] - cluster id to label resolution
//!
//! ## Example
//!
//! ```rust
//! use sdgx_core::{align, predict, FeatureSpec, KMeans, LabelTables, Record, SchemeId, TaggedModel};
//!
//! let spec = FeatureSpec::new(vec!["r710".to_string()], Default::default()).unwrap();
//! let records: Vec<Record> = vec![
//!     serde_json::json!({"nama_desa": "WATES", "r710": 40}).as_object().unwrap().clone(),
//! ];
//!
//! let model = KMeans::new(vec![vec![50.0], vec![2.0]]).unwrap();
//! let tagged = TaggedModel::detect(Box::new(model)).unwrap();
//!
//! let matrix = align(&records, &spec).unwrap();
//! let clusters = predict(&tagged, &matrix, spec.categorical()).unwrap();
//!
//! let labels = LabelTables::builtin();
//! let scheme = SchemeId::new(1).unwrap();
//! assert_eq!(labels.resolve(scheme, clusters[0]), Some("Desa Prioritas Penanganan Kemiskinan"));
//! ```

pub mod align;
pub mod dispatch;
pub mod distance;
pub mod error;
pub mod feature;
pub mod kmeans;
pub mod kmodes;
pub mod kprototypes;
pub mod labels;
pub mod model;
pub mod record;

pub use align::{align, FeatureMatrix};
pub use dispatch::{predict, TaggedModel};
pub use error::{Error, Result};
pub use feature::{CategoricalIndex, FeatureSpec};
pub use kmeans::KMeans;
pub use kmodes::KModes;
pub use kprototypes::KPrototypes;
pub use labels::{LabelTable, LabelTables};
pub use model::{ClusterModel, ModelArtifact, ModelConvention, ModelKind, PredictCapability};
pub use record::{value_to_text, Cell, ClusterId, EnrichedRecord, Record, SchemeId, CLUSTER_COLUMN, LABEL_COLUMN};
