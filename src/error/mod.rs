//! Error types for kubedig

use thiserror::Error;

/// Main error type for kubedig
#[derive(Debug, Error)]
pub enum DigError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Bucket registration: {0}")]
    Registration(String),

    #[error("unknown bucket {0:?}")]
    UnknownBucket(String),

    #[error("buckets need a kubernetes client for initialization")]
    MissingClient,

    #[error("bucket {0:?} still reports a missing client after bootstrap, its registration is inconsistent")]
    ClientMisdeclared(String),

    #[error("couldn't init bucket {name:?}: {reason}")]
    BucketInit { name: String, reason: String },

    #[error("{0}")]
    Bucket(String),

    #[error("cannot output JSON for bucket {0:?}, inconsistence between width of headers and data")]
    WidthMismatch(String),

    #[error("failed to clean up {count} object(s): {}", failures.join("; "))]
    Cleanup { count: usize, failures: Vec<String> },

    #[error("failed loading context to initialize client: {0}")]
    Bootstrap(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DigError {
    /// Shorthand for a bucket runtime failure
    pub fn bucket(msg: impl Into<String>) -> Self {
        DigError::Bucket(msg.into())
    }
}

impl From<serde_json::Error> for DigError {
    fn from(e: serde_json::Error) -> Self {
        DigError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for DigError {
    fn from(e: toml::de::Error) -> Self {
        DigError::Config(e.to_string())
    }
}

impl From<procfs::ProcError> for DigError {
    fn from(e: procfs::ProcError) -> Self {
        DigError::Bucket(e.to_string())
    }
}

/// Result type alias for kubedig
pub type Result<T> = std::result::Result<T, DigError>;
