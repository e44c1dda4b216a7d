//! Song and draft records.

use serde::{Deserialize, Serialize};

use versepad_shared::text::{line_count, word_count};
use versepad_shared::{ids, now_rfc3339};

/// Which storage backend the library currently reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageMode {
    Local,
    Remote,
}

/// A named snapshot of lyric content attached to a song.
///
/// Drafts are created and deleted only by explicit user action and never
/// expire. A song holds at most [`crate::drafts::MAX_DRAFTS`] of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub id: String,
    pub name: String,
    pub content: String,
    pub timestamp: String,
}

/// A song record, owned exclusively by the song library and mutated only
/// through its operations.
///
/// `id` is either a server-assigned identifier or a client-generated
/// `song-<millis>-<suffix>` id for records that have not been persisted
/// remotely. `audio_file_url` is a remote URL or a `local:<id>` blob ref.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub filename: String,
    pub word_count: u32,
    pub line_count: u32,
    pub date_added: String,
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub drafts: Vec<DraftSnapshot>,
    #[serde(default)]
    pub audio_file_url: Option<String>,
    #[serde(default)]
    pub audio_file_name: Option<String>,
    #[serde(default)]
    pub audio_file_size: Option<u64>,
    #[serde(default)]
    pub audio_duration: Option<f64>,
    #[serde(default)]
    pub is_example: bool,
}

impl SongRecord {
    /// New song with a client-generated id and counts computed from content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let content = content.into();
        let mut song = Self {
            id: ids::new_local_id("song"),
            filename: format!("{}.txt", title),
            title,
            content,
            word_count: 0,
            line_count: 0,
            date_added: now_rfc3339(),
            date_modified: None,
            drafts: Vec::new(),
            audio_file_url: None,
            audio_file_name: None,
            audio_file_size: None,
            audio_duration: None,
            is_example: false,
        };
        song.refresh_counts();
        song
    }

    /// Recomputes word/line counts from the current content.
    pub fn refresh_counts(&mut self) {
        self.word_count = word_count(&self.content);
        self.line_count = line_count(&self.content);
    }

    pub fn touch_modified(&mut self) {
        self.date_modified = Some(now_rfc3339());
    }

    pub fn draft(&self, draft_id: &str) -> Option<&DraftSnapshot> {
        self.drafts.iter().find(|d| d.id == draft_id)
    }

    pub fn draft_mut(&mut self, draft_id: &str) -> Option<&mut DraftSnapshot> {
        self.drafts.iter_mut().find(|d| d.id == draft_id)
    }
}
