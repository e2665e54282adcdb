//! Model dispatch
//!
//! A [`TaggedModel`] carries the calling convention decided at load time, so
//! prediction is a plain match instead of probing the model per request.

use std::fmt;

use crate::align::FeatureMatrix;
use crate::error::{Error, Result};
use crate::feature::CategoricalIndex;
use crate::model::{ClusterModel, ModelConvention, PredictCapability};
use crate::record::ClusterId;

/// A loaded model tagged with the convention it is invoked with
pub struct TaggedModel {
    model: Box<dyn ClusterModel>,
    convention: ModelConvention,
}

impl TaggedModel {
    /// Tag a model by detecting its convention
    pub fn detect(model: Box<dyn ClusterModel>) -> Result<Self> {
        let convention = ModelConvention::detect(model.as_ref())?;
        Ok(Self { model, convention })
    }

    /// Tag a model with an explicitly configured convention
    pub fn with_convention(model: Box<dyn ClusterModel>, convention: ModelConvention) -> Result<Self> {
        if model.capability() == PredictCapability::Unavailable {
            return Err(Error::NoPredictCapability(model.type_name().to_string()));
        }
        Ok(Self { model, convention })
    }

    #[inline]
    pub fn convention(&self) -> ModelConvention {
        self.convention
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        self.model.type_name()
    }

    #[inline]
    pub fn model(&self) -> &dyn ClusterModel {
        self.model.as_ref()
    }
}

impl fmt::Debug for TaggedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedModel")
            .field("type_name", &self.model.type_name())
            .field("convention", &self.convention)
            .finish()
    }
}

/// Run a tagged model over the matrix, one cluster id per row.
///
/// Convention A models are called without the categorical positions;
/// B and C receive them unchanged.
pub fn predict(
    tagged: &TaggedModel,
    matrix: &FeatureMatrix,
    categorical: &CategoricalIndex,
) -> Result<Vec<ClusterId>> {
    let labels = match tagged.convention {
        ModelConvention::Centroid => tagged.model.predict(matrix, None),
        ModelConvention::MixedPrototype | ModelConvention::Categorical => {
            tagged.model.predict(matrix, Some(categorical))
        }
    }
    .map_err(|e| match e {
        Error::Prediction(_) | Error::NoPredictCapability(_) | Error::PredictionLength { .. } => e,
        other => Error::Prediction(other.to_string()),
    })?;

    if labels.len() != matrix.n_rows() {
        return Err(Error::PredictionLength {
            expected: matrix.n_rows(),
            actual: labels.len(),
        });
    }

    tracing::debug!(
        model = tagged.type_name(),
        convention = %tagged.convention,
        rows = labels.len(),
        "predicted clusters"
    );
    Ok(labels)
}
