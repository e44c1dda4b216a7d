//! Draft registry: named snapshots attached to a song.
//!
//! Creation only builds the snapshot; the caller merges it into the owning
//! song and persists. Deletion is a plain removal here; the editor
//! coordinator is responsible for closing any tab that referenced the draft.

use versepad_shared::{ids, now_rfc3339};

use crate::model::{DraftSnapshot, SongRecord};

/// Hard cap on drafts per song, enforced with a user-facing rejection.
pub const MAX_DRAFTS: usize = 5;

/// Builds a new draft for `song`, or `None` when the cap is reached.
///
/// The name is "Draft N" for the N-th slot; the id combines a timestamp with
/// a random suffix so rapid successive calls never collide.
pub fn new_draft(song: &SongRecord, content: &str) -> Option<DraftSnapshot> {
    if song.drafts.len() >= MAX_DRAFTS {
        return None;
    }
    Some(DraftSnapshot {
        id: ids::new_draft_id(),
        name: format!("Draft {}", song.drafts.len() + 1),
        content: content.to_string(),
        timestamp: now_rfc3339(),
    })
}

/// Removes `draft_id` from `song`. Returns whether anything was removed.
pub fn remove_draft(song: &mut SongRecord, draft_id: &str) -> bool {
    let before = song.drafts.len();
    song.drafts.retain(|d| d.id != draft_id);
    song.drafts.len() != before
}
