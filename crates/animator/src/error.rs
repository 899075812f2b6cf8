//! Animator error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimatorError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Cached state has no frame 0")]
    MissingBaseFrame,

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
