// Error taxonomy for the clustering pipeline.
//
// Configuration and input problems (bad category, missing keyword file,
// unsupported language) fail the whole run. Quality-metric problems at a single
// threshold are recorded on that threshold's result by the cluster engine and
// never abort a sweep.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// Category code outside the fixed enumerated set.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// A keyword or dictionary resource is missing or malformed.
    #[error("failed to load {}: {reason}", path.display())]
    LoadError {
        /// Resource that failed to load.
        path: PathBuf,
        /// Human-readable explanation.
        reason: String,
    },

    /// An environment or CLI setting could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Language not supported by the tokenizer, POS table, or keyword source.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Non-positive vector size, epochs, threshold, or branching factor.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// Silhouette scoring needs at least two clusters and fewer clusters than points.
    #[error("insufficient clusters: found {found} distinct labels for {samples} samples")]
    InsufficientClusters {
        /// Distinct cluster labels in the assignment.
        found: usize,
        /// Number of assigned points.
        samples: usize,
    },

    /// Unknown case id.
    #[error("case not found: {0}")]
    NotFound(String),

    /// Vectors (or labels) with inconsistent length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// A capability the implementation does not provide.
    #[error("{0} is not supported by this tagger")]
    Unsupported(&'static str),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::LoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
