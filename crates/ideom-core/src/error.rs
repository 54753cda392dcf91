//! Error types for ideom operations.
//!
//! Only two kinds of failure are visible to callers of the engine:
//! connecting unknown nodes and loading a malformed persisted file.
//! Numeric corner cases (empty templates, zero weights, empty seed lists)
//! resolve to zero or empty results locally and never surface here.

use crate::types::IdeomId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ideom operations.
pub type Result<T> = std::result::Result<T, IdeomError>;

#[derive(Debug, Error)]
pub enum IdeomError {
    /// An edge endpoint does not exist in the graph.
    #[error("ideom not found: {0}")]
    NodeNotFound(IdeomId),

    /// A persisted document could not be parsed or is inconsistent.
    /// Nothing from the file has been applied.
    #[error("failed to load {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IdeomError {
    pub fn load_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_not_found_names_the_id() {
        let err = IdeomError::NodeNotFound(IdeomId::from("ghost"));
        assert_eq!(err.to_string(), "ideom not found: ghost");
    }

    #[test]
    fn load_failure_names_the_path() {
        let err = IdeomError::load_failure("/tmp/ideoms.json", "expected value");
        assert!(err.to_string().contains("/tmp/ideoms.json"));
        assert!(err.to_string().contains("expected value"));
    }
}
