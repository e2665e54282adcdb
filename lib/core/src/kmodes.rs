//! K-Modes inference
//!
//! Every column is compared against each cluster's mode as a category;
//! the row goes to the cluster with the fewest mismatches.

use serde::{Deserialize, Serialize};

use crate::align::FeatureMatrix;
use crate::distance::argmin;
use crate::error::{Error, Result};
use crate::feature::CategoricalIndex;
use crate::model::{ClusterModel, PredictCapability};
use crate::record::{Cell, ClusterId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KModes {
    /// Mode of each cluster, one category per feature
    pub cluster_centroids: Vec<Vec<String>>,
}

impl KModes {
    pub fn new(cluster_centroids: Vec<Vec<String>>) -> Result<Self> {
        let model = Self { cluster_centroids };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        let width = self.n_features();
        if self.cluster_centroids.is_empty() || width == 0 {
            return Err(Error::InvalidModel("kmodes has no centroids".to_string()));
        }
        if let Some(i) = self.cluster_centroids.iter().position(|c| c.len() != width) {
            return Err(Error::InvalidModel(format!(
                "kmodes centroid {} has width {}, expected {}",
                i,
                self.cluster_centroids[i].len(),
                width
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.cluster_centroids.first().map_or(0, Vec::len)
    }
}

impl ClusterModel for KModes {
    fn type_name(&self) -> &str {
        "KModes"
    }

    // The categorical positions are accepted but not declared: every column
    // is categorical to this model.
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
                "unexpected data shape: {} columns, model has {}",
                matrix.n_cols(),
                self.n_features()
            )));
        }

        let mut labels = Vec::with_capacity(matrix.n_rows());
        for cells in matrix.rows() {
            let costs = self
                .cluster_centroids
                .iter()
                .map(|mode| mismatches(cells, mode) as f64);
            let nearest = argmin(costs)
                .ok_or_else(|| Error::Prediction("kmodes has no centroids".to_string()))?;
            labels.push(nearest as ClusterId);
        }
        Ok(labels)
    }
}

fn mismatches(cells: &[Cell], mode: &[String]) -> usize {
    cells
        .iter()
        .zip(mode)
        .filter(|(cell, category)| !cell.matches(category))
        .count()
}
