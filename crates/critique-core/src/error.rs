//! Error types for critique

use std::path::PathBuf;

/// Result type alias using critique's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for critique operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Training data is absent and there is no persisted model to fall back on
    #[error("training data not found at {}", path.display())]
    MissingData { path: PathBuf },

    /// A data row does not match the expected schema
    #[error("malformed data at line {line}: {message}")]
    MalformedData { line: u64, message: String },

    /// A persisted model exists but cannot be restored
    #[error("corrupt model artifact {}: {message}", path.display())]
    CorruptArtifact { path: PathBuf, message: String },

    /// Training could not produce a model
    #[error("training error: {0}")]
    Training(String),

    /// Metrics could not be computed
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Tensor backend errors
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new missing-data error
    pub fn missing_data(path: impl Into<PathBuf>) -> Self {
        Self::MissingData { path: path.into() }
    }

    /// Create a new malformed-data error for a 1-based line number
    pub fn malformed(line: u64, msg: impl Into<String>) -> Self {
        Self::MalformedData {
            line,
            message: msg.into(),
        }
    }

    /// Create a new corrupt-artifact error
    pub fn corrupt_artifact(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::CorruptArtifact {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new evaluation error
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Create a new backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the artifact on disk is unusable
    pub fn is_corrupt_artifact(&self) -> bool {
        matches!(self, Self::CorruptArtifact { .. })
    }
}
