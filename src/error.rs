//! Error types for the scheduling engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading inputs or running the engine.
///
/// Only structurally invalid input is fatal; everything else (missing
/// optional files, git failures, unknown ids) degrades to an empty signal
/// and is surfaced as a warning at the call site.
#[derive(Debug, Error)]
pub enum Error {
    /// The task tree is structurally invalid and no output can be derived.
    #[error("invalid task tree at node '{id}': {reason}")]
    InvalidTree { id: String, reason: String },

    /// A required file could not be read or written.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file exists but does not parse as the expected JSON shape.
    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn invalid_tree(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTree {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
