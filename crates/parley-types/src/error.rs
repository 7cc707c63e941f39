use thiserror::Error;

/// Errors surfaced by session and event operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(key) => SessionError::NotFound(key),
            other => SessionError::Storage(other.to_string()),
        }
    }
}

/// Errors from store operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("{0} not found")]
    NotFound(String),
}
