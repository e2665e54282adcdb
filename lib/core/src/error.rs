use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing column in input data: '{0}'")]
    MissingColumn(String),

    #[error("Invalid feature spec: {0}")]
    InvalidFeatureSpec(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Model '{0}' has no predict capability")]
    NoPredictCapability(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Model returned {actual} cluster ids for {expected} rows")]
    PredictionLength { expected: usize, actual: usize },

    #[error("Invalid label table: {0}")]
    InvalidLabels(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

