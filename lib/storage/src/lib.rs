pub mod artifacts;
pub mod error;
pub mod file_sink;
pub mod postgrest;
pub mod sink;

pub use artifacts::{ArtifactPaths, ArtifactStore, SchemeArtifacts, SchemeEntry};
pub use error::{ArtifactError, SinkError};
pub use file_sink::{JsonFileSink, PersistedResult};
pub use postgrest::{PostgrestSink, DEFAULT_KEY_COLUMN};
pub use sink::{MemorySink, NoopSink, ResultSink};
