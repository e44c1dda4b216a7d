//! Tab manager: the ordered list of open editing contexts.
//!
//! Two invariants hold across every mutation: the list never contains two
//! tabs with the same `(song_id, draft_id)` pair, and the active index is
//! always valid while the list is non-empty. Opening an already-open pair
//! activates it instead of duplicating it, which also guarantees at most one
//! scratch tab. Every mutation persists immediately so tabs survive reload.

pub mod model;

pub use model::{TabRef, TabsSnapshot};

use std::path::Path;

use parking_lot::Mutex;

use versepad_shared::json_store::StoreResult;
use versepad_shared::{default_storage_root, profile_dir, JsonFile};

pub struct TabStore {
    file: JsonFile<TabsSnapshot>,
    snapshot: Mutex<TabsSnapshot>,
}

impl TabStore {
    pub fn open_default_profile() -> StoreResult<Self> {
        Self::open_profile("default")
    }

    pub fn open_profile(profile: impl Into<String>) -> StoreResult<Self> {
        Self::open_at(&default_storage_root(), &profile.into())
    }

    pub fn open_at(root: &Path, profile: &str) -> StoreResult<Self> {
        let file: JsonFile<TabsSnapshot> =
            JsonFile::new(profile_dir(root, profile).join("tabs.json"));
        let mut snapshot = file.load()?;
        // Clamp a persisted index that no longer fits the list.
        if snapshot.active_index >= snapshot.tabs.len() && !snapshot.tabs.is_empty() {
            snapshot.active_index = snapshot.tabs.len() - 1;
        }
        Ok(Self {
            file,
            snapshot: Mutex::new(snapshot),
        })
    }

    pub fn snapshot(&self) -> TabsSnapshot {
        self.snapshot.lock().clone()
    }

    pub fn tabs(&self) -> Vec<TabRef> {
        self.snapshot.lock().tabs.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.lock().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.lock().tabs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.snapshot.lock().active_index
    }

    pub fn active_tab(&self) -> Option<TabRef> {
        self.snapshot.lock().active_tab().cloned()
    }

    /// Opens (or activates) the tab for this pair. Returns its index.
    pub fn open_tab(&self, tab: TabRef) -> StoreResult<usize> {
        let mut snapshot = self.snapshot.lock();
        let index = match snapshot.position_of(&tab) {
            Some(existing) => existing,
            None => {
                snapshot.tabs.push(tab);
                snapshot.tabs.len() - 1
            }
        };
        snapshot.active_index = index;
        self.file.save(&snapshot)?;
        Ok(index)
    }

    /// Closes the tab at `index`; out of range is a no-op.
    ///
    /// Closing a tab before the active one shifts the active index down by
    /// one; closing the active tab clamps it to the new last index.
    pub fn close_tab(&self, index: usize) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock();
        if index >= snapshot.tabs.len() {
            return Ok(());
        }
        snapshot.tabs.remove(index);
        if snapshot.tabs.is_empty() {
            snapshot.active_index = 0;
        } else if index < snapshot.active_index {
            snapshot.active_index -= 1;
        } else if snapshot.active_index >= snapshot.tabs.len() {
            snapshot.active_index = snapshot.tabs.len() - 1;
        }
        self.file.save(&snapshot)
    }

    /// Closes the tab matching this exact pair, if open.
    pub fn close_matching(&self, tab: &TabRef) -> StoreResult<()> {
        let index = { self.snapshot.lock().position_of(tab) };
        match index {
            Some(index) => self.close_tab(index),
            None => Ok(()),
        }
    }

    /// Closes every tab referencing `song_id` (main content and drafts).
    pub fn close_tabs_for_song(&self, song_id: &str) -> StoreResult<()> {
        loop {
            let index = {
                let snapshot = self.snapshot.lock();
                snapshot
                    .tabs
                    .iter()
                    .position(|t| t.song_id.as_deref() == Some(song_id))
            };
            match index {
                Some(index) => self.close_tab(index)?,
                None => return Ok(()),
            }
        }
    }

    /// Makes the tab at `index` active; out of range is a no-op.
    pub fn switch_tab(&self, index: usize) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock();
        if index >= snapshot.tabs.len() {
            return Ok(());
        }
        snapshot.active_index = index;
        self.file.save(&snapshot)
    }

    pub fn close_all(&self) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock();
        snapshot.tabs.clear();
        snapshot.active_index = 0;
        self.file.save(&snapshot)
    }

    /// Rebinds the active tab to a song id. Used when the scratch buffer is
    /// promoted to a persisted song: the tab keeps its position instead of a
    /// new tab being opened.
    pub fn rebind_active(&self, song_id: impl Into<String>) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock();
        let index = snapshot.active_index;
        if let Some(tab) = snapshot.tabs.get_mut(index) {
            tab.song_id = Some(song_id.into());
        }
        self.file.save(&snapshot)
    }
}
