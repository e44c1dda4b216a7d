//! Tab data model.
//!
//! A tab is a weak reference into the song collection: it names its referent
//! by id and owns nothing. `song_id == None` is the single scratch buffer for
//! not-yet-saved content; `draft_id == None` means the song's main content
//! rather than a named draft.

use serde::{Deserialize, Serialize};

/// An open editing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRef {
    pub song_id: Option<String>,
    pub draft_id: Option<String>,
}

impl TabRef {
    /// Main-content tab for a song.
    pub fn song(song_id: impl Into<String>) -> Self {
        Self {
            song_id: Some(song_id.into()),
            draft_id: None,
        }
    }

    /// Tab for a named draft of a song.
    pub fn draft(song_id: impl Into<String>, draft_id: impl Into<String>) -> Self {
        Self {
            song_id: Some(song_id.into()),
            draft_id: Some(draft_id.into()),
        }
    }

    /// The unsaved scratch buffer.
    pub fn scratch() -> Self {
        Self {
            song_id: None,
            draft_id: None,
        }
    }

    pub fn is_scratch(&self) -> bool {
        self.song_id.is_none()
    }

    pub fn is_draft(&self) -> bool {
        self.draft_id.is_some()
    }
}

fn default_schema_version() -> u32 {
    1
}

/// Persisted tab list and active index; survives reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub tabs: Vec<TabRef>,
    #[serde(default)]
    pub active_index: usize,
}

impl Default for TabsSnapshot {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            tabs: Vec::new(),
            active_index: 0,
        }
    }
}

impl TabsSnapshot {
    /// Index of the tab matching the exact `(song_id, draft_id)` pair.
    pub fn position_of(&self, tab: &TabRef) -> Option<usize> {
        self.tabs.iter().position(|t| t == tab)
    }

    pub fn active_tab(&self) -> Option<&TabRef> {
        self.tabs.get(self.active_index)
    }
}
