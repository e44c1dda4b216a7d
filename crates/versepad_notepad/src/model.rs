//! Persisted notepad buffer state.

use serde::{Deserialize, Serialize};

fn default_schema_version() -> u32 {
    1
}

fn default_title() -> String {
    "Untitled".to_string()
}

/// Window size of the floating notepad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 560.0,
        }
    }
}

/// Window position of the floating notepad.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The single live editing buffer, mirroring whichever tab is active.
///
/// `current_editing_song_id` always equals the `song_id` of the active tab,
/// or `None` when no tabs are open or a scratch buffer is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotepadState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub current_editing_song_id: Option<String>,
}

impl Default for NotepadState {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            content: String::new(),
            title: default_title(),
            is_minimized: false,
            dimensions: Dimensions::default(),
            position: Position::default(),
            current_editing_song_id: None,
        }
    }
}
