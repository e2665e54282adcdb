//! Per-scheme model artifacts on disk
//!
//! Each scheme `n` owns three files in the models directory:
//!
//! - `model_sdg{n}.json` - the trained model ([`ModelArtifact`])
//! - `features_sdg{n}.json` - ordered feature names
//! - `cat_idx_sdg{n}.json` - categorical column positions
//!
//! Nothing is cached: every load re-reads all three, so a replaced model
//! is picked up by the next request.

use sdgx_core::{CategoricalIndex, FeatureSpec, ModelArtifact, SchemeId, TaggedModel};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ArtifactError;

const MODEL_PREFIX: &str = "model_sdg";
const FEATURES_PREFIX: &str = "features_sdg";
const CATEGORICAL_PREFIX: &str = "cat_idx_sdg";
const EXTENSION: &str = "json";

/// Locations of one scheme's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub features: PathBuf,
    pub categorical: PathBuf,
}

/// Everything needed to run one scheme's model
#[derive(Debug)]
pub struct SchemeArtifacts {
    pub scheme: SchemeId,
    pub model: TaggedModel,
    pub spec: FeatureSpec,
    /// SHA-256 of the model file
    pub digest: String,
}

/// Availability of a scheme discovered in the models directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeEntry {
    pub scheme: SchemeId,
    pub model: String,
    pub complete: bool,
}

/// Loader for the per-scheme artifact triple
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the artifact locations for a scheme
    pub fn paths(&self, scheme: SchemeId) -> ArtifactPaths {
        let file = |prefix: &str| self.root.join(format!("{}{}.{}", prefix, scheme, EXTENSION));
        ArtifactPaths {
            model: file(MODEL_PREFIX),
            features: file(FEATURES_PREFIX),
            categorical: file(CATEGORICAL_PREFIX),
        }
    }

    /// Load and tag the model, then its feature spec.
    ///
    /// A missing model is [`ArtifactError::NotFound`]; every other problem,
    /// including missing companion files, is [`ArtifactError::Load`].
    pub fn load(&self, scheme: SchemeId) -> Result<SchemeArtifacts, ArtifactError> {
        let paths = self.paths(scheme);

        if !paths.model.is_file() {
            return Err(ArtifactError::NotFound {
                scheme,
                path: paths.model,
            });
        }

        let bytes = fs::read(&paths.model).map_err(|e| ArtifactError::load(&paths.model, e))?;
        let digest = format!("{:x}", Sha256::digest(&bytes));
        let artifact =
            ModelArtifact::from_slice(&bytes).map_err(|e| ArtifactError::load(&paths.model, e))?;
        let explicit = artifact.convention;
        let model = artifact.into_model();
        let model = match explicit {
            Some(convention) => TaggedModel::with_convention(model, convention),
            None => TaggedModel::detect(model),
        }
        .map_err(|e| ArtifactError::load(&paths.model, e))?;

        info!(
            scheme = %scheme,
            model = model.type_name(),
            convention = %model.convention(),
            explicit = explicit.is_some(),
            digest = %&digest[..12],
            "loaded model"
        );

        for companion in [&paths.features, &paths.categorical] {
            if !companion.is_file() {
                return Err(ArtifactError::load(
                    companion,
                    format!("feature or categorical index file missing for SDG {}", scheme),
                ));
            }
        }

        let features: Vec<String> = read_json(&paths.features)?;
        let categorical: CategoricalIndex = read_json(&paths.categorical)?;
        let spec = FeatureSpec::new(features, categorical)
            .map_err(|e| ArtifactError::load(&paths.features, e))?;

        debug!(
            scheme = %scheme,
            features = spec.len(),
            categorical = ?spec.categorical().as_slice(),
            "loaded feature spec"
        );

        Ok(SchemeArtifacts {
            scheme,
            model,
            spec,
            digest,
        })
    }

    /// Schemes with a model file in the models directory, in scheme order
    pub fn list_schemes(&self) -> Result<Vec<SchemeEntry>, ArtifactError> {
        let entries = fs::read_dir(&self.root).map_err(|e| ArtifactError::load(&self.root, e))?;

        let mut schemes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ArtifactError::load(&self.root, e))?;
            let path = entry.path();
            let Some(scheme) = scheme_from_model_file(&path) else {
                continue;
            };
            let paths = self.paths(scheme);
            schemes.push(SchemeEntry {
                scheme,
                model: entry.file_name().to_string_lossy().into_owned(),
                complete: paths.features.is_file() && paths.categorical.is_file(),
            });
        }

        schemes.sort_by_key(|s| s.scheme);
        Ok(schemes)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| ArtifactError::load(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::load(path, e))
}

fn scheme_from_model_file(path: &Path) -> Option<SchemeId> {
    if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix(MODEL_PREFIX))
        .and_then(|n| n.parse::<u32>().ok())
        .and_then(SchemeId::new)
}
