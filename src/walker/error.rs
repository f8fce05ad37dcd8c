use std::path::PathBuf;

use crate::store::StoreError;

/// Errors that abort a walk.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid JSON in {}: {}", .0.display(), .1)]
    Json(PathBuf, #[source] serde_json::Error),

    /// The JSON parsed but does not have the expected shape.
    #[error("Malformed snapshot {}: {}", .0.display(), .1)]
    Malformed(PathBuf, String),

    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),
}

pub type WalkResult<T> = Result<T, WalkError>;
