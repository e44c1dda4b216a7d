//! Notepad state holder: the single live editing buffer.
//!
//! Content and title edits land in memory synchronously and reach disk via a
//! 400 ms trailing-edge debounce so rapid typing coalesces into one write.
//! Window geometry changes are discrete actions and persist immediately.
//! Dropping the store flushes any pending debounced write.

pub mod model;

pub use model::{Dimensions, NotepadState, Position};

use std::path::Path;

use parking_lot::Mutex;

use versepad_shared::json_store::StoreResult;
use versepad_shared::{default_storage_root, profile_dir, Debounced, JsonFile};

/// Debounce window for content/title writes.
const CONTENT_DEBOUNCE_MS: u64 = 400;

pub struct NotepadStore {
    storage: Debounced<NotepadState>,
    state: Mutex<NotepadState>,
}

impl NotepadStore {
    pub fn open_default_profile() -> StoreResult<Self> {
        Self::open_profile("default")
    }

    pub fn open_profile(profile: impl Into<String>) -> StoreResult<Self> {
        Self::open_at(&default_storage_root(), &profile.into())
    }

    /// Opens the notepad store rooted at an explicit directory (tests use a
    /// temp dir here).
    pub fn open_at(root: &Path, profile: &str) -> StoreResult<Self> {
        let file: JsonFile<NotepadState> =
            JsonFile::new(profile_dir(root, profile).join("notepad.json"));
        let mut state = file.load()?;

        // A buffer saved without a bound song would resume orphaned content
        // from some earlier context; reset it. Geometry is kept.
        if state.current_editing_song_id.is_none() {
            state.content.clear();
            state.title = "Untitled".to_string();
        }

        let storage = Debounced::new(file, CONTENT_DEBOUNCE_MS);
        Ok(Self {
            storage,
            state: Mutex::new(state),
        })
    }

    pub fn state(&self) -> NotepadState {
        self.state.lock().clone()
    }

    pub fn content(&self) -> String {
        self.state.lock().content.clone()
    }

    pub fn title(&self) -> String {
        self.state.lock().title.clone()
    }

    pub fn current_editing_song_id(&self) -> Option<String> {
        self.state.lock().current_editing_song_id.clone()
    }

    /// Updates the live content; persistence is debounced.
    pub fn update_content(&self, content: impl Into<String>) {
        let mut state = self.state.lock();
        state.content = content.into();
        self.storage.save(&state);
    }

    /// Updates the live title; persistence is debounced.
    pub fn update_title(&self, title: impl Into<String>) {
        let mut state = self.state.lock();
        state.title = title.into();
        self.storage.save(&state);
    }

    /// Replaces the whole buffer when a tab is loaded. Persists immediately:
    /// a tab switch is a discrete action, not typing.
    pub fn load_buffer(
        &self,
        content: impl Into<String>,
        title: impl Into<String>,
        song_id: Option<String>,
    ) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.content = content.into();
        state.title = title.into();
        state.current_editing_song_id = song_id;
        self.storage.save_immediate(&state)
    }

    /// Resets the buffer to empty/"Untitled" (last tab closed).
    pub fn reset_buffer(&self) -> StoreResult<()> {
        self.load_buffer(String::new(), "Untitled".to_string(), None)
    }

    pub fn toggle_minimized(&self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.is_minimized = !state.is_minimized;
        self.storage.save_immediate(&state)
    }

    pub fn set_dimensions(&self, dimensions: Dimensions) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.dimensions = dimensions;
        self.storage.save_immediate(&state)
    }

    pub fn set_position(&self, position: Position) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.position = position;
        self.storage.save_immediate(&state)
    }

    /// Forces any pending debounced write to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.storage.flush()
    }
}
