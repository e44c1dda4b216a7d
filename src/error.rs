use thiserror::Error;

use versepad_shared::json_store::StoreError;
use versepad_songs::drafts::MAX_DRAFTS;
use versepad_songs::SongError;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Song(#[from] SongError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("a song can hold at most {MAX_DRAFTS} drafts")]
    DraftLimit,
    #[error("song not found: {0}")]
    SongNotFound(String),
    #[error("draft not found: {0}")]
    DraftNotFound(String),
    #[error("no song is active")]
    NoActiveSong,
    /// Caller bug: converting the scratch buffer into a song while a saved
    /// song is bound to the active tab. Logged, never shown to the user.
    #[error("upload requested while a saved song is active")]
    UploadWhileEditing,
}

pub type EditorResult<T> = Result<T, EditorError>;
