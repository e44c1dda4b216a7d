//! Editor coordinator: wires the notepad buffer, tab list, draft registry,
//! and song library into one multi-document editor.
//!
//! The notepad is a single shared buffer reused across all tabs, so every
//! tab-switching operation persists the outgoing context strictly before
//! loading the incoming one. That ordering is a correctness requirement, not
//! an optimization.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use versepad_notepad::NotepadStore;
use versepad_shared::text::{sanitize_content, sanitize_title};
use versepad_shared::{diagnostics, now_rfc3339};
use versepad_songs::drafts;
use versepad_songs::model::{SongRecord, StorageMode};
use versepad_songs::remote::RemoteStore;
use versepad_songs::{DraftSnapshot, SongError, SongLibrary};
use versepad_tabs::{TabRef, TabStore};

use crate::error::{EditorError, EditorResult};
use crate::prompt::Prompt;

/// Last-saved snapshot of the active tab's referent; the baseline for
/// unsaved-change detection and revert.
#[derive(Debug, Clone)]
struct Baseline {
    content: String,
    title: String,
}

pub struct Editor {
    notepad: NotepadStore,
    tabs: TabStore,
    library: SongLibrary,
    prompt: Arc<dyn Prompt>,
    baseline: Mutex<Option<Baseline>>,
    /// Holding slot for the scratch ("new content") buffer while another tab
    /// is active.
    scratch: Mutex<String>,
}

impl Editor {
    pub fn open_default_profile(
        remote: Arc<dyn RemoteStore>,
        prompt: Arc<dyn Prompt>,
    ) -> EditorResult<Self> {
        Self::open_at(&versepad_shared::default_storage_root(), "default", remote, prompt)
    }

    pub fn open_at(
        root: &Path,
        profile: &str,
        remote: Arc<dyn RemoteStore>,
        prompt: Arc<dyn Prompt>,
    ) -> EditorResult<Self> {
        let editor = Self {
            notepad: NotepadStore::open_at(root, profile)?,
            tabs: TabStore::open_at(root, profile)?,
            library: SongLibrary::open_at(root, profile, remote)?,
            prompt,
            baseline: Mutex::new(None),
            scratch: Mutex::new(String::new()),
        };
        // Re-sync with whatever tab survived the reload, keeping any unsaved
        // edits the buffer carried across the restart.
        editor.restore_session()?;
        Ok(editor)
    }

    /// Startup variant of [`activate_current`](Editor::activate_current):
    /// when the persisted buffer still belongs to the active tab's referent,
    /// the buffer is kept as the live content (it may hold edits that were
    /// never saved into the song) and only the baseline comes from the
    /// referent, so `has_unsaved_changes` reports the difference.
    fn restore_session(&self) -> EditorResult<()> {
        let restored = self.notepad.current_editing_song_id();
        if let (Some(song_id), Some(tab)) = (restored, self.tabs.active_tab()) {
            if tab.song_id.as_deref() == Some(song_id.as_str()) {
                if let Some(song) = self.library.get(&song_id) {
                    let baseline = match tab.draft_id.as_deref() {
                        Some(draft_id) => song.draft(draft_id).map(|draft| Baseline {
                            content: draft.content.clone(),
                            title: song.title.clone(),
                        }),
                        None => Some(Baseline {
                            content: song.content,
                            title: song.title,
                        }),
                    };
                    if let Some(baseline) = baseline {
                        *self.baseline.lock() = Some(baseline);
                        return Ok(());
                    }
                }
            }
        }
        self.activate_current()
    }

    pub fn notepad(&self) -> &NotepadStore {
        &self.notepad
    }

    pub fn tabs(&self) -> &TabStore {
        &self.tabs
    }

    pub fn library(&self) -> &SongLibrary {
        &self.library
    }

    // ---- saving -------------------------------------------------------

    /// Writes the live buffer into the active tab's referent.
    ///
    /// A scratch tab has nothing to save into; that case is a no-op. In
    /// remote mode the song collection is updated in memory only — pushing
    /// every auto-save to the remote backend could clobber concurrent edits
    /// from another device, so remote persistence happens solely through
    /// [`save_changes`](Editor::save_changes).
    pub fn save_current_tab(&self) -> EditorResult<()> {
        let Some(tab) = self.tabs.active_tab() else {
            return Ok(());
        };
        let Some(song_id) = tab.song_id.clone() else {
            return Ok(());
        };
        let Some(mut song) = self.library.get(&song_id) else {
            // Referent is gone; the tab is dangling.
            self.tabs.close_matching(&tab)?;
            return self.activate_current();
        };

        let content = self.notepad.content();
        let title = self.notepad.title();
        match tab.draft_id.as_deref() {
            Some(draft_id) => match song.draft_mut(draft_id) {
                Some(draft) => {
                    draft.content = content.clone();
                    draft.timestamp = now_rfc3339();
                }
                None => {
                    self.tabs.close_matching(&tab)?;
                    return self.activate_current();
                }
            },
            None => {
                song.content = content.clone();
                song.title = title.clone();
                song.refresh_counts();
                song.touch_modified();
            }
        }
        self.library.stage_song(song)?;
        *self.baseline.lock() = Some(Baseline { content, title });
        Ok(())
    }

    /// Explicit manual save: sanitizes, recomputes metadata, and persists to
    /// the active backend unconditionally. The only path that writes an
    /// existing song remotely.
    pub fn save_changes(&self) -> EditorResult<()> {
        let Some(tab) = self.tabs.active_tab() else {
            return Ok(());
        };
        let Some(song_id) = tab.song_id.clone() else {
            // The scratch buffer is persisted via upload_to_songs.
            return Ok(());
        };
        let Some(mut song) = self.library.get(&song_id) else {
            return Err(EditorError::SongNotFound(song_id));
        };

        let content = sanitize_content(&self.notepad.content());
        let title = sanitize_title(&self.notepad.title());
        let display_title;
        match tab.draft_id.as_deref() {
            Some(draft_id) => {
                let Some(draft) = song.draft_mut(draft_id) else {
                    return Err(EditorError::DraftNotFound(draft_id.to_string()));
                };
                draft.content = content.clone();
                draft.timestamp = now_rfc3339();
                display_title = song.title.clone();
            }
            None => {
                song.content = content.clone();
                song.title = title.clone();
                song.refresh_counts();
                song.touch_modified();
                display_title = title;
            }
        }

        if let Err(e) = self.library.commit_song(song) {
            self.prompt.alert(&format!("Could not save the song: {}", e));
            return Err(e.into());
        }
        self.notepad
            .load_buffer(content.clone(), display_title.clone(), Some(song_id))?;
        *self.baseline.lock() = Some(Baseline {
            content,
            title: display_title,
        });
        Ok(())
    }

    /// Restores the last-saved snapshot after interactive confirmation.
    /// No-op when there is nothing to revert to.
    pub fn revert_changes(&self) -> EditorResult<()> {
        let Some(baseline) = self.baseline.lock().clone() else {
            return Ok(());
        };
        if !self
            .prompt
            .confirm("Discard your changes and restore the last saved version?")
        {
            return Ok(());
        }
        let song_id = self.tabs.active_tab().and_then(|t| t.song_id);
        self.notepad
            .load_buffer(baseline.content, baseline.title, song_id)?;
        Ok(())
    }

    // ---- scratch buffer ----------------------------------------------

    /// Converts the scratch buffer into a persisted song. The current tab is
    /// rebound in place; no new tab is opened.
    pub fn upload_to_songs(&self) -> EditorResult<SongRecord> {
        let on_scratch = self
            .tabs
            .active_tab()
            .map(|t| t.is_scratch())
            .unwrap_or(false);
        if !on_scratch {
            // Must never happen per the tab-model invariant; a caller bug.
            diagnostics::log("upload_to_songs invoked while a saved song is active");
            return Err(EditorError::UploadWhileEditing);
        }

        let content = sanitize_content(&self.notepad.content());
        let title = sanitize_title(&self.notepad.title());
        if content.trim().is_empty() {
            self.prompt.alert("Nothing to save yet: write some lyrics first.");
            return Err(EditorError::Song(SongError::Validation(
                "nothing to save: the notepad is empty".to_string(),
            )));
        }

        let song = match self.library.create_song(SongRecord::new(title.clone(), content.clone())) {
            Ok(song) => song,
            Err(e) => {
                self.prompt.alert(&format!("Could not save the song: {}", e));
                return Err(e.into());
            }
        };
        self.tabs.rebind_active(&song.id)?;
        self.scratch.lock().clear();
        self.notepad
            .load_buffer(content.clone(), title.clone(), Some(song.id.clone()))?;
        *self.baseline.lock() = Some(Baseline { content, title });
        Ok(song)
    }

    /// Opens (or re-activates) the scratch buffer, persisting whatever was
    /// active first. Only one scratch tab ever exists.
    pub fn start_new_content(&self) -> EditorResult<()> {
        self.persist_outgoing()?;
        self.tabs.open_tab(TabRef::scratch())?;
        let held = self.scratch.lock().clone();
        self.notepad.load_buffer(held, "Untitled", None)?;
        *self.baseline.lock() = None;
        Ok(())
    }

    // ---- opening and switching ---------------------------------------

    pub fn edit_song(&self, song_id: &str) -> EditorResult<()> {
        self.persist_outgoing()?;
        let song = self
            .library
            .get(song_id)
            .ok_or_else(|| EditorError::SongNotFound(song_id.to_string()))?;
        self.tabs.open_tab(TabRef::song(song_id))?;
        self.notepad
            .load_buffer(song.content.clone(), song.title.clone(), Some(song.id))?;
        *self.baseline.lock() = Some(Baseline {
            content: song.content,
            title: song.title,
        });
        Ok(())
    }

    pub fn open_draft(&self, song_id: &str, draft_id: &str) -> EditorResult<()> {
        self.persist_outgoing()?;
        let song = self
            .library
            .get(song_id)
            .ok_or_else(|| EditorError::SongNotFound(song_id.to_string()))?;
        let draft = song
            .draft(draft_id)
            .ok_or_else(|| EditorError::DraftNotFound(draft_id.to_string()))?
            .clone();
        self.tabs.open_tab(TabRef::draft(song_id, draft_id))?;
        self.notepad
            .load_buffer(draft.content.clone(), song.title.clone(), Some(song.id))?;
        *self.baseline.lock() = Some(Baseline {
            content: draft.content,
            title: song.title,
        });
        Ok(())
    }

    pub fn switch_tab(&self, index: usize) -> EditorResult<()> {
        if index >= self.tabs.len() {
            return Ok(());
        }
        self.persist_outgoing()?;
        self.tabs.switch_tab(index)?;
        self.activate_current()
    }

    pub fn close_tab(&self, index: usize) -> EditorResult<()> {
        if index >= self.tabs.len() {
            return Ok(());
        }
        self.persist_outgoing()?;
        self.tabs.close_tab(index)?;
        self.activate_current()
    }

    /// Saves the outgoing context: the scratch buffer is stashed into its
    /// holding slot, a bound tab is saved into its referent.
    fn persist_outgoing(&self) -> EditorResult<()> {
        match self.tabs.active_tab() {
            None => Ok(()),
            Some(tab) if tab.is_scratch() => {
                *self.scratch.lock() = self.notepad.content();
                Ok(())
            }
            Some(_) => self.save_current_tab(),
        }
    }

    /// Loads the active tab's referent into the notepad, closing dangling
    /// tabs until a live one (or none) remains.
    fn activate_current(&self) -> EditorResult<()> {
        loop {
            let Some(tab) = self.tabs.active_tab() else {
                self.notepad.reset_buffer()?;
                *self.baseline.lock() = None;
                return Ok(());
            };
            let Some(song_id) = tab.song_id.clone() else {
                let held = self.scratch.lock().clone();
                self.notepad.load_buffer(held, "Untitled", None)?;
                *self.baseline.lock() = None;
                return Ok(());
            };
            let Some(song) = self.library.get(&song_id) else {
                self.tabs.close_matching(&tab)?;
                continue;
            };
            match tab.draft_id.as_deref() {
                Some(draft_id) => {
                    let Some(draft) = song.draft(draft_id) else {
                        self.tabs.close_matching(&tab)?;
                        continue;
                    };
                    self.notepad.load_buffer(
                        draft.content.clone(),
                        song.title.clone(),
                        Some(song_id),
                    )?;
                    *self.baseline.lock() = Some(Baseline {
                        content: draft.content.clone(),
                        title: song.title.clone(),
                    });
                }
                None => {
                    self.notepad.load_buffer(
                        song.content.clone(),
                        song.title.clone(),
                        Some(song_id),
                    )?;
                    *self.baseline.lock() = Some(Baseline {
                        content: song.content,
                        title: song.title,
                    });
                }
            }
            return Ok(());
        }
    }

    // ---- drafts -------------------------------------------------------

    /// Snapshots the live buffer into a new draft on the active song.
    pub fn create_draft_from_current(&self) -> EditorResult<DraftSnapshot> {
        let song_id = self
            .tabs
            .active_tab()
            .and_then(|t| t.song_id)
            .ok_or(EditorError::NoActiveSong)?;
        let mut song = self
            .library
            .get(&song_id)
            .ok_or_else(|| EditorError::SongNotFound(song_id.clone()))?;

        let Some(draft) = drafts::new_draft(&song, &self.notepad.content()) else {
            self.prompt.alert(&format!(
                "A song can hold at most {} drafts.",
                drafts::MAX_DRAFTS
            ));
            return Err(EditorError::DraftLimit);
        };
        song.drafts.push(draft.clone());
        self.library.stage_song(song)?;
        Ok(draft)
    }

    /// Deletes a draft and closes any tab that referenced it.
    pub fn delete_draft(&self, song_id: &str, draft_id: &str) -> EditorResult<()> {
        let mut song = self
            .library
            .get(song_id)
            .ok_or_else(|| EditorError::SongNotFound(song_id.to_string()))?;
        if !drafts::remove_draft(&mut song, draft_id) {
            return Err(EditorError::DraftNotFound(draft_id.to_string()));
        }
        self.library.stage_song(song)?;
        self.tabs.close_matching(&TabRef::draft(song_id, draft_id))?;
        self.activate_current()
    }

    // ---- library passthroughs ----------------------------------------

    pub fn delete_song(&self, song_id: &str) -> EditorResult<()> {
        let Some(song) = self.library.get(song_id) else {
            return Err(EditorError::SongNotFound(song_id.to_string()));
        };
        if !self
            .prompt
            .confirm(&format!("Delete \"{}\"? This cannot be undone.", song.title))
        {
            return Ok(());
        }
        if let Err(e) = self.library.delete_song(song_id) {
            self.prompt.alert(&format!("Could not delete the song: {}", e));
            return Err(e.into());
        }
        self.tabs.close_tabs_for_song(song_id)?;
        self.activate_current()
    }

    pub fn switch_storage(&self, mode: StorageMode) -> EditorResult<()> {
        self.persist_outgoing()?;
        // The outgoing save only queued the debounced list write, and the
        // write gate will discard it once the mode flips. Land it now.
        if self.library.mode() == StorageMode::Local {
            self.library.save_local_now()?;
        }
        if let Err(e) = self.library.switch_mode(mode) {
            self.prompt.alert(&format!("Could not switch storage: {}", e));
            return Err(e.into());
        }
        // Tabs bound to the previous backend's songs are now dangling.
        self.activate_current()
    }

    /// Copies a song into the other backend after the user confirms. The
    /// dialog states explicitly that this is a copy: users tend to expect a
    /// move, and the original stays in the source backend.
    pub fn transfer_song(&self, song_id: &str) -> EditorResult<()> {
        let song = self
            .library
            .get(song_id)
            .ok_or_else(|| EditorError::SongNotFound(song_id.to_string()))?;
        let destination = match self.library.mode() {
            StorageMode::Local => "your cloud library",
            StorageMode::Remote => "this device",
        };
        if !self.prompt.confirm(&format!(
            "Copy \"{}\" to {}? The original stays where it is.",
            song.title, destination
        )) {
            return Ok(());
        }
        if let Err(e) = self.library.transfer_song(song_id) {
            self.prompt.alert(&format!("Could not transfer the song: {}", e));
            return Err(e.into());
        }
        Ok(())
    }

    // ---- derived state ------------------------------------------------

    /// True iff a song is being edited, a baseline exists, and the live
    /// content differs from it. Recomputed on every call, never cached.
    pub fn has_unsaved_changes(&self) -> bool {
        let editing_song = self
            .tabs
            .active_tab()
            .map(|t| t.song_id.is_some())
            .unwrap_or(false);
        if !editing_song {
            return false;
        }
        match self.baseline.lock().as_ref() {
            Some(baseline) => self.notepad.content() != baseline.content,
            None => false,
        }
    }

    /// One auto-save tick. Runs only while at least one tab is open and the
    /// local backend is active; the loop is disabled entirely in remote mode.
    pub fn autosave_tick(&self) {
        if self.tabs.is_empty() || self.library.is_remote() {
            return;
        }
        if let Err(e) = self.save_current_tab() {
            diagnostics::log(format!("auto-save failed: {}", e));
        }
    }

    /// Flushes pending debounced writes (notepad buffer and local list).
    pub fn flush(&self) -> EditorResult<()> {
        self.notepad.flush()?;
        self.library.flush()?;
        Ok(())
    }
}
