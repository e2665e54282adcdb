use sdgx_core::SchemeId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures resolving a scheme's artifact triple
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The model file itself is absent; the operator can add it
    #[error("Model for SDG {scheme} is not available. Add {} to the models directory ({}).", file_name(.path), parent_dir(.path))]
    NotFound { scheme: SchemeId, path: PathBuf },

    /// The model or a companion artifact is missing or unreadable
    #[error("Failed to load artifact {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
}

impl ArtifactError {
    pub(crate) fn load(path: &std::path::Path, reason: impl ToString) -> Self {
        ArtifactError::Load {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound { .. })
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &std::path::Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// Failures persisting enriched records
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink error: {0}")]
    Other(String),
}
