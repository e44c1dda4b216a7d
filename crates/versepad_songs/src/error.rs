use thiserror::Error;

use versepad_shared::json_store::StoreError;

/// Failure taxonomy for library operations: validation problems are rejected
/// synchronously with no state change; backend failures are reported to the
/// caller, which rolls back or reloads from the backend of record.
#[derive(Debug, Error)]
pub enum SongError {
    #[error("song not found: {0}")]
    NotFound(String),
    #[error("not signed in to the remote library")]
    NotAuthenticated,
    #[error("remote request failed: {0}")]
    Remote(String),
    #[error("audio storage failed: {0}")]
    Audio(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Validation(String),
}

pub type SongResult<T> = Result<T, SongError>;
