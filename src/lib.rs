//! versepad: a headless multi-tab lyric notepad engine.
//!
//! The [`Editor`] coordinates a single live notepad buffer, an ordered tab
//! list, per-song draft snapshots, and a song library that stores either on
//! this device or behind a remote API. The UI layer drives it through plain
//! method calls and supplies a [`Prompt`] for confirmations and alerts.
//!
//! ```rust,ignore
//! let remote = Arc::new(HttpRemote::with_token("https://api.example", token)?);
//! let editor = Arc::new(Editor::open_default_profile(remote, Arc::new(MyPrompt))?);
//! let _autosave = AutosaveLoop::start(editor.clone());
//!
//! editor.start_new_content()?;
//! editor.notepad().update_content("paper moon above the harbor light");
//! let song = editor.upload_to_songs()?;
//! ```

pub mod autosave;
pub mod editor;
pub mod error;
pub mod prompt;

pub use autosave::{AutosaveLoop, AUTOSAVE_INTERVAL};
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use prompt::{AutoConfirm, Prompt};

pub use versepad_notepad::NotepadStore;
pub use versepad_songs::{DraftSnapshot, SongLibrary, SongRecord, StorageMode};
pub use versepad_tabs::{TabRef, TabStore};
