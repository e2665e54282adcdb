//! Clustering models and their calling conventions
//!
//! Trained models come in three incompatible calling shapes:
//!
//! - **Centroid** (convention A): numeric-only `predict(matrix)`
//! - **MixedPrototype** (convention B): `predict(matrix, categorical)` over
//!   numeric and textual columns together
//! - **Categorical** (convention C): same call shape as B, categorical-only
//!   distance underneath
//!
//! A model is classified into one of these once, when its artifact is
//! loaded; see [`ModelConvention::detect`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::align::FeatureMatrix;
use crate::error::{Error, Result};
use crate::feature::CategoricalIndex;
use crate::kmeans::KMeans;
use crate::kmodes::KModes;
use crate::kprototypes::KPrototypes;
use crate::record::ClusterId;

/// Type-name marker identifying purely categorical models
pub const CATEGORICAL_MODEL_MARKER: &str = "kmodes";

/// What a model's prediction entry point declares it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictCapability {
    /// No prediction entry point at all
    Unavailable,
    /// `predict(matrix)`
    Plain,
    /// `predict(matrix, categorical)`
    WithCategorical,
}

/// A trained clustering model
pub trait ClusterModel: Send + Sync + fmt::Debug {
    /// Model type name, e.g. `KMeans`
    fn type_name(&self) -> &str;

    /// Declared prediction capability
    fn capability(&self) -> PredictCapability;

    /// Assign one cluster id per matrix row.
    ///
    /// `categorical` is `Some` only when the caller dispatched with the
    /// categorical call shape.
    fn predict(
        &self,
        matrix: &FeatureMatrix,
        categorical: Option<&CategoricalIndex>,
    ) -> Result<Vec<ClusterId>>;
}

/// Calling convention a loaded model is dispatched with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelConvention {
    /// Convention A: centroid-distance over a numeric matrix
    Centroid,
    /// Convention B: mixed numeric/categorical prototypes
    MixedPrototype,
    /// Convention C: categorical-only modes
    Categorical,
}

impl ModelConvention {
    /// Classify a model by its declared capability, falling back to its
    /// type name. First match wins:
    ///
    /// 1. capability takes categorical indices: B, or C for `kmodes` types
    /// 2. plain capability, type name without the `kmodes` marker: A
    /// 3. anything else with a prediction entry point: C
    pub fn detect(model: &dyn ClusterModel) -> Result<Self> {
        let categorical_type = model
            .type_name()
            .to_ascii_lowercase()
            .contains(CATEGORICAL_MODEL_MARKER);

        match model.capability() {
            PredictCapability::Unavailable => {
                Err(Error::NoPredictCapability(model.type_name().to_string()))
            }
            PredictCapability::WithCategorical if categorical_type => Ok(Self::Categorical),
            PredictCapability::WithCategorical => Ok(Self::MixedPrototype),
            PredictCapability::Plain if !categorical_type => Ok(Self::Centroid),
            PredictCapability::Plain => Ok(Self::Categorical),
        }
    }

    /// Whether the categorical index set is passed to `predict`
    #[inline]
    pub fn takes_categorical(self) -> bool {
        !matches!(self, Self::Centroid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::MixedPrototype => "mixed_prototype",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ModelConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized model artifact.
///
/// ```json
/// {"algorithm": "kprototypes", "gamma": 0.5,
///  "numeric_centroids": [[1.0], [9.0]],
///  "categorical_centroids": [["1"], ["2"]]}
/// ```
///
/// An optional `"convention"` field tags the calling convention explicitly
/// and bypasses detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<ModelConvention>,
    #[serde(flatten)]
    pub model: ModelKind,
}

/// Built-in model families
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum ModelKind {
    KMeans(KMeans),
    KPrototypes(KPrototypes),
    KModes(KModes),
}

impl ModelArtifact {
    /// Parse and validate an artifact from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: Self =
            serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.model {
            ModelKind::KMeans(m) => m.validate(),
            ModelKind::KPrototypes(m) => m.validate(),
            ModelKind::KModes(m) => m.validate(),
        }
    }

    /// Box the model behind the common trait
    pub fn into_model(self) -> Box<dyn ClusterModel> {
        match self.model {
            ModelKind::KMeans(m) => Box::new(m),
            ModelKind::KPrototypes(m) => Box::new(m),
            ModelKind::KModes(m) => Box::new(m),
        }
    }
}
