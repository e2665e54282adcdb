pub mod pipeline;
pub mod rest;

pub use pipeline::{ClusteringRequest, ClusteringResponse, ClusteringService, PipelineError};
pub use rest::{json_config, RestApi};
