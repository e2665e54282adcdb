//! K-Means inference
//!
//! Nearest-centroid assignment over a purely numeric matrix. Text cells are
//! accepted only when they parse as numbers.

use serde::{Deserialize, Serialize};

use crate::align::FeatureMatrix;
use crate::distance::{argmin, squared_euclidean};
use crate::error::{Error, Result};
use crate::feature::CategoricalIndex;
use crate::model::{ClusterModel, PredictCapability};
use crate::record::ClusterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// One center per cluster, in cluster id order
    pub cluster_centers: Vec<Vec<f64>>,
}

impl KMeans {
    pub fn new(cluster_centers: Vec<Vec<f64>>) -> Result<Self> {
        let model = Self { cluster_centers };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        let first = self
            .cluster_centers
            .first()
            .ok_or_else(|| Error::InvalidModel("kmeans has no cluster centers".to_string()))?;
        if first.is_empty() {
            return Err(Error::InvalidModel("kmeans centers have zero width".to_string()));
        }
        for (i, center) in self.cluster_centers.iter().enumerate() {
            if center.len() != first.len() {
                return Err(Error::InvalidModel(format!(
                    "kmeans center {} has width {}, expected {}",
                    i,
                    center.len(),
                    first.len()
                )));
            }
            if center.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidModel(format!("kmeans center {} is not finite", i)));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.cluster_centers.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.cluster_centers.len()
    }
}

impl ClusterModel for KMeans {
    fn type_name(&self) -> &str {
        "KMeans"
    }

    fn capability(&self) -> PredictCapability {
        PredictCapability::Plain
    }

    fn predict(
        &self,
        matrix: &FeatureMatrix,
        _categorical: Option<&CategoricalIndex>,
    ) -> Result<Vec<ClusterId>> {
        if matrix.n_cols() != self.n_features() {
            return Err(Error::Prediction(format!(
                "X has {} features, but KMeans is expecting {} features as input",
                matrix.n_cols(),
                self.n_features()
            )));
        }

        let mut point = vec![0.0; self.n_features()];
        let mut labels = Vec::with_capacity(matrix.n_rows());
        for (row, cells) in matrix.rows().enumerate() {
            for (j, cell) in cells.iter().enumerate() {
                let value = cell.as_f64().ok_or_else(|| {
                    Error::Prediction(format!(
                        "could not convert '{}' in column '{}' to float",
                        cell.to_text(),
                        matrix.columns()[j]
                    ))
                })?;
                if value.is_nan() {
                    return Err(Error::Prediction(format!("input contains NaN at row {}", row)));
                }
                point[j] = value;
            }

            let nearest = argmin(
                self.cluster_centers
                    .iter()
                    .map(|center| squared_euclidean(&point, center)),
            )
            .ok_or_else(|| Error::Prediction("kmeans has no cluster centers".to_string()))?;
            labels.push(nearest as ClusterId);
        }
        Ok(labels)
    }
}
