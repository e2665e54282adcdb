//! Feature spec definitions
//!
//! A feature spec fixes the column order a model was fit with and marks
//! which of those columns hold categorical values. Both halves are
//! training-time facts: they must be re-supplied unchanged at inference.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Positions of categorical columns within a feature list.
///
/// Kept exactly as stored (order and all), since the list is handed to
/// mixed-type models verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoricalIndex(Vec<usize>);

impl CategoricalIndex {
    pub fn new(positions: Vec<usize>) -> Self {
        Self(positions)
    }

    #[inline]
    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for CategoricalIndex {
    fn from(positions: Vec<usize>) -> Self {
        Self(positions)
    }
}

/// Ordered feature names paired with their categorical positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSpec {
    features: Vec<String>,
    categorical: CategoricalIndex,
}

impl FeatureSpec {
    /// Build a feature spec, checking that every categorical position
    /// indexes into the feature list and that names are unique
    pub fn new(features: Vec<String>, categorical: CategoricalIndex) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InvalidFeatureSpec("feature list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(features.len());
        for name in &features {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidFeatureSpec(format!("duplicate feature '{}'", name)));
            }
        }

        if let Some(bad) = categorical.iter().find(|&i| i >= features.len()) {
            return Err(Error::InvalidFeatureSpec(format!(
                "categorical index {} out of range for {} features",
                bad,
                features.len()
            )));
        }

        Ok(Self { features, categorical })
    }

    #[inline]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[inline]
    pub fn categorical(&self) -> &CategoricalIndex {
        &self.categorical
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn is_categorical(&self, position: usize) -> bool {
        self.categorical.contains(position)
    }

    /// Names of the columns compared by value rather than distance
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.categorical
            .iter()
            .map(|i| self.features[i].as_str())
            .collect()
    }

    /// Names of the columns passed through as numbers
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.categorical.contains(*i))
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_feature_spec_columns() {
        let spec = FeatureSpec::new(names(&["r710", "r1502_7", "r1502_8"]), vec![1, 2].into()).unwrap();
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.numeric_columns(), vec!["r710"]);
        assert_eq!(spec.categorical_columns(), vec!["r1502_7", "r1502_8"]);
        assert!(spec.is_categorical(2));
        assert!(!spec.is_categorical(0));
    }

    #[test]
    fn test_categorical_index_out_of_range() {
        let err = FeatureSpec::new(names(&["a", "b"]), vec![2].into()).unwrap_err();
        assert!(matches!(err, Error::InvalidFeatureSpec(_)));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let err = FeatureSpec::new(names(&["a", "a"]), CategoricalIndex::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_categorical_order_preserved() {
        let index: CategoricalIndex = serde_json::from_str("[3, 1]").unwrap();
        assert_eq!(index.as_slice(), &[3, 1]);
    }
}
