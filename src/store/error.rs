/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store has no project configured.
    #[error("Store not configured. Set store.project_id in the config file or DOCMIRROR_PROJECT_ID.")]
    NotConfigured,

    /// A collection or document path segment is empty or contains '/'.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// Transport-level failure talking to the store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A response could not be decoded into documents.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
