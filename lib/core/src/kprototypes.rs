//! K-Prototypes inference
//!
//! Mixed numeric/categorical prototypes. The cost of assigning a row to a
//! cluster is the squared Euclidean distance over the numeric columns plus
//! `gamma` times the number of categorical mismatches.

use serde::{Deserialize, Serialize};

use crate::align::FeatureMatrix;
use crate::distance::{argmin, matching_dissimilarity, squared_euclidean};
use crate::error::{Error, Result};
use crate::feature::CategoricalIndex;
use crate::model::{ClusterModel, PredictCapability};
use crate::record::ClusterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KPrototypes {
    /// Numeric part of each prototype, numeric columns in feature order
    pub numeric_centroids: Vec<Vec<f64>>,
    /// Categorical part of each prototype, in categorical index order
    pub categorical_centroids: Vec<Vec<String>>,
    /// Weight of categorical mismatches against numeric distance
    pub gamma: f64,
}

impl KPrototypes {
    pub fn new(
        numeric_centroids: Vec<Vec<f64>>,
        categorical_centroids: Vec<Vec<String>>,
        gamma: f64,
    ) -> Result<Self> {
        let model = Self {
            numeric_centroids,
            categorical_centroids,
            gamma,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.numeric_centroids.is_empty() {
            return Err(Error::InvalidModel("kprototypes has no clusters".to_string()));
        }
        if self.numeric_centroids.len() != self.categorical_centroids.len() {
            return Err(Error::InvalidModel(format!(
                "kprototypes has {} numeric and {} categorical centroids",
                self.numeric_centroids.len(),
                self.categorical_centroids.len()
            )));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(Error::InvalidModel(format!("invalid gamma {}", self.gamma)));
        }

        let (num_width, cat_width) = (self.numeric_width(), self.categorical_width());
        if num_width + cat_width == 0 {
            return Err(Error::InvalidModel("kprototypes centroids have zero width".to_string()));
        }
        for (i, (num, cat)) in self
            .numeric_centroids
            .iter()
            .zip(&self.categorical_centroids)
            .enumerate()
        {
            if num.len() != num_width || cat.len() != cat_width {
                return Err(Error::InvalidModel(format!(
                    "kprototypes centroid {} has inconsistent width",
                    i
                )));
            }
            if num.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidModel(format!(
                    "kprototypes centroid {} is not finite",
                    i
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn numeric_width(&self) -> usize {
        self.numeric_centroids.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn categorical_width(&self) -> usize {
        self.categorical_centroids.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.numeric_centroids.len()
    }
}

impl ClusterModel for KPrototypes {
    fn type_name(&self) -> &str {
        "KPrototypes"
    }

    fn capability(&self) -> PredictCapability {
        PredictCapability::WithCategorical
    }

    fn predict(
        &self,
        matrix: &FeatureMatrix,
        categorical: Option<&CategoricalIndex>,
    ) -> Result<Vec<ClusterId>> {
        let categorical = categorical.ok_or_else(|| {
            Error::Prediction("kprototypes requires the categorical column positions".to_string())
        })?;

        if let Some(bad) = categorical.iter().find(|&i| i >= matrix.n_cols()) {
            return Err(Error::Prediction(format!(
                "categorical index {} out of range for {} columns",
                bad,
                matrix.n_cols()
            )));
        }
        let numeric: Vec<usize> = (0..matrix.n_cols())
            .filter(|i| !categorical.contains(*i))
            .collect();

        if numeric.len() != self.numeric_width() || categorical.len() != self.categorical_width() {
            return Err(Error::Prediction(format!(
                "expected {} numeric and {} categorical columns, got {} and {}",
                self.numeric_width(),
                self.categorical_width(),
                numeric.len(),
                categorical.len()
            )));
        }

        let mut num_point = vec![0.0; numeric.len()];
        let mut cat_point = vec![String::new(); categorical.len()];
        let mut labels = Vec::with_capacity(matrix.n_rows());
        for (row, cells) in matrix.rows().enumerate() {
            for (slot, &j) in numeric.iter().enumerate() {
                let value = cells[j].as_f64().ok_or_else(|| {
                    Error::Prediction(format!(
                        "could not convert '{}' in column '{}' to float",
                        cells[j].to_text(),
                        matrix.columns()[j]
                    ))
                })?;
                if value.is_nan() {
                    return Err(Error::Prediction(format!("input contains NaN at row {}", row)));
                }
                num_point[slot] = value;
            }
            for (slot, j) in categorical.iter().enumerate() {
                cat_point[slot] = cells[j].to_text();
            }

            let costs = self
                .numeric_centroids
                .iter()
                .zip(&self.categorical_centroids)
                .map(|(num, cat)| {
                    squared_euclidean(&num_point, num)
                        + self.gamma * matching_dissimilarity(&cat_point, cat) as f64
                });
            let nearest = argmin(costs)
                .ok_or_else(|| Error::Prediction("kprototypes has no clusters".to_string()))?;
            labels.push(nearest as ClusterId);
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;

    fn model() -> KPrototypes {
        KPrototypes::new(
            vec![vec![0.0], vec![10.0]],
            vec![vec!["a".into()], vec!["b".into()]],
            5.0,
        )
        .unwrap()
    }

    fn matrix(rows: Vec<Vec<Cell>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(vec!["x".into(), "cat".into()], rows).unwrap()
    }

    #[test]
    fn test_kprototypes_mixed_cost() {
        let x = matrix(vec![
            vec![Cell::Number(1.0), Cell::Text("a".into())],
            vec![Cell::Number(9.0), Cell::Text("b".into())],
            // 16 + 5 against 36 + 0
            vec![Cell::Number(4.0), Cell::Text("b".into())],
        ]);
        let index = CategoricalIndex::new(vec![1]);
        assert_eq!(model().predict(&x, Some(&index)).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn test_kprototypes_requires_categorical() {
        let x = matrix(vec![vec![Cell::Number(1.0), Cell::Text("a".into())]]);
        let err = model().predict(&x, None).unwrap_err();
        assert!(err.to_string().contains("categorical"));
    }

    #[test]
    fn test_kprototypes_unseen_category_is_mismatch() {
        let x = matrix(vec![vec![Cell::Number(6.0), Cell::Text("zzz".into())]]);
        let index = CategoricalIndex::new(vec![1]);
        // 36 + 5 vs 16 + 5
        assert_eq!(model().predict(&x, Some(&index)).unwrap(), vec![1]);
    }

    #[test]
    fn test_kprototypes_shape_mismatch() {
        let x = matrix(vec![vec![Cell::Number(1.0), Cell::Text("a".into())]]);
        let index = CategoricalIndex::new(vec![]);
        assert!(matches!(model().predict(&x, Some(&index)), Err(Error::Prediction(_))));
    }

    #[test]
    fn test_kprototypes_validation() {
        assert!(KPrototypes::new(vec![vec![1.0]], vec![], 1.0).is_err());
        assert!(KPrototypes::new(vec![vec![1.0]], vec![vec!["a".into()]], -1.0).is_err());
        assert!(KPrototypes::new(
            vec![vec![1.0], vec![1.0, 2.0]],
            vec![vec!["a".into()], vec!["b".into()]],
            1.0
        )
        .is_err());
    }
}
