//! Song collection manager: single source of truth for the song list and the
//! active storage backend.
//!
//! Mode switching and reloading are guarded by boolean re-entrancy flags, not
//! locks: there is one logical thread of control, and the flags exist to turn
//! a stale async callback (a debounced autosave firing mid-switch) into a
//! no-op instead of a racing write. The debounced local autosave re-checks
//! the flags at flush time through the write gate.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use versepad_shared::debounce::WriteGate;
use versepad_shared::{diagnostics, ids, Debounced};

use crate::blobs::{is_remote_ref, BlobStore};
use crate::error::{SongError, SongResult};
use crate::local::{LocalSongsFile, LocalStore};
use crate::model::{SongRecord, StorageMode};
use crate::remote::RemoteStore;

/// Debounce window for the background persist of the local song list.
const LIST_AUTOSAVE_MS: u64 = 2_000;

pub struct SongLibrary {
    songs: Arc<Mutex<Vec<SongRecord>>>,
    mode: Arc<Mutex<StorageMode>>,
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
    blobs: BlobStore,
    example_deleted: Arc<AtomicBool>,
    switching: Arc<AtomicBool>,
    reloading: Arc<AtomicBool>,
    autosave: Debounced<LocalSongsFile>,
}

impl SongLibrary {
    /// Opens the library in local mode, seeding the example song on first
    /// run.
    pub fn open_at(root: &Path, profile: &str, remote: Arc<dyn RemoteStore>) -> SongResult<Self> {
        let local = LocalStore::open_at(root, profile);
        let blobs = BlobStore::open_at(root);
        let data = local.load_or_seed()?;

        let songs = Arc::new(Mutex::new(data.songs));
        let mode = Arc::new(Mutex::new(StorageMode::Local));
        let example_deleted = Arc::new(AtomicBool::new(data.example_deleted));
        let switching = Arc::new(AtomicBool::new(false));
        let reloading = Arc::new(AtomicBool::new(false));

        // The gate re-checks the flags and the mode when a debounced write
        // actually lands, so a write queued before a switch/reload cannot
        // clobber freshly loaded data.
        let gate: WriteGate = {
            let mode = mode.clone();
            let switching = switching.clone();
            let reloading = reloading.clone();
            Arc::new(move || {
                *mode.lock() == StorageMode::Local
                    && !switching.load(Ordering::SeqCst)
                    && !reloading.load(Ordering::SeqCst)
            })
        };
        let autosave = Debounced::with_gate(local.file().clone(), LIST_AUTOSAVE_MS, Some(gate));

        Ok(Self {
            songs,
            mode,
            local,
            remote,
            blobs,
            example_deleted,
            switching,
            reloading,
            autosave,
        })
    }

    pub fn mode(&self) -> StorageMode {
        *self.mode.lock()
    }

    pub fn is_remote(&self) -> bool {
        self.mode() == StorageMode::Remote
    }

    pub fn songs(&self) -> Vec<SongRecord> {
        self.songs.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<SongRecord> {
        self.songs.lock().iter().find(|s| s.id == id).cloned()
    }

    fn snapshot_local(&self) -> LocalSongsFile {
        LocalSongsFile {
            songs: self.songs.lock().clone(),
            example_deleted: self.example_deleted.load(Ordering::SeqCst),
            ..Default::default()
        }
    }

    /// Replaces the record in memory. In local mode this also queues the
    /// debounced list autosave; in remote mode it deliberately does not touch
    /// the backend, so concurrent edits from another device are not
    /// clobbered. Remote persistence happens only through [`commit_song`].
    ///
    /// [`commit_song`]: SongLibrary::commit_song
    pub fn stage_song(&self, song: SongRecord) -> SongResult<()> {
        self.replace_in_memory(song)?;
        if self.mode() == StorageMode::Local {
            self.queue_autosave();
        }
        Ok(())
    }

    /// Replaces the record in memory and persists to the active backend
    /// unconditionally. This is the only path that writes an existing song to
    /// the remote backend.
    pub fn commit_song(&self, song: SongRecord) -> SongResult<()> {
        self.replace_in_memory(song.clone())?;
        match self.mode() {
            StorageMode::Local => self.save_local_now(),
            StorageMode::Remote => self.remote.update(&song.id, &song),
        }
    }

    fn replace_in_memory(&self, song: SongRecord) -> SongResult<()> {
        let mut songs = self.songs.lock();
        let slot = songs
            .iter_mut()
            .find(|s| s.id == song.id)
            .ok_or_else(|| SongError::NotFound(song.id.clone()))?;
        *slot = song;
        Ok(())
    }

    /// Creates a song in the active backend and returns it with its final id
    /// (server-assigned in remote mode).
    pub fn create_song(&self, mut song: SongRecord) -> SongResult<SongRecord> {
        match self.mode() {
            StorageMode::Local => {
                if song.id.is_empty() {
                    song.id = ids::new_local_id("song");
                }
                self.songs.lock().push(song.clone());
                self.save_local_now()?;
            }
            StorageMode::Remote => {
                song.id = self.remote.create(&song)?;
                self.songs.lock().push(song.clone());
            }
        }
        Ok(song)
    }

    /// Deletes a song: optimistic removal, best-effort audio cleanup, then
    /// backend deletion. A backend failure rolls the removal back and
    /// reloads from the backend of record.
    pub fn delete_song(&self, id: &str) -> SongResult<()> {
        let removed = {
            let mut songs = self.songs.lock();
            let index = songs
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| SongError::NotFound(id.to_string()))?;
            (index, songs.remove(index))
        };
        let (index, song) = removed;

        // Audio cleanup must not block the deletion itself.
        if let Some(reference) = song.audio_file_url.as_deref() {
            if !is_remote_ref(reference) {
                if let Err(e) = self.blobs.delete(reference) {
                    log::warn!("audio cleanup for {} failed: {}", id, e);
                }
            }
        }

        let result = match self.mode() {
            StorageMode::Local => {
                if song.is_example {
                    self.example_deleted.store(true, Ordering::SeqCst);
                }
                self.save_local_now()
            }
            StorageMode::Remote => self.remote.delete(id),
        };

        if let Err(e) = result {
            // Roll back the optimistic removal, then re-establish a
            // known-good state from the backend of record.
            {
                let mut songs = self.songs.lock();
                let at = index.min(songs.len());
                songs.insert(at, song);
            }
            if let Err(reload_err) = self.reload() {
                log::warn!("reload after failed delete also failed: {}", reload_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Reloads the song list from the active backend. Skipped when a reload
    /// is already in flight.
    pub fn reload(&self) -> SongResult<()> {
        if self.reloading.swap(true, Ordering::SeqCst) {
            diagnostics::log("reload skipped: already in flight");
            return Ok(());
        }
        let result = self.reload_inner(self.mode());
        self.reloading.store(false, Ordering::SeqCst);
        result
    }

    fn reload_inner(&self, mode: StorageMode) -> SongResult<()> {
        let loaded = match mode {
            StorageMode::Local => {
                let data = self.local.load_or_seed()?;
                self.example_deleted.store(data.example_deleted, Ordering::SeqCst);
                data.songs
            }
            StorageMode::Remote => self.remote.list()?,
        };
        *self.songs.lock() = loaded;
        Ok(())
    }

    /// Switches the active backend and reloads the whole list from it (no
    /// merge). A switch already in progress makes this a silent no-op;
    /// switching to remote without a session is rejected.
    pub fn switch_mode(&self, target: StorageMode) -> SongResult<()> {
        if self.switching.swap(true, Ordering::SeqCst) {
            diagnostics::log("storage switch ignored: switch already in progress");
            return Ok(());
        }
        let result = (|| {
            if self.mode() == target {
                return Ok(());
            }
            if target == StorageMode::Remote && !self.remote.is_authenticated() {
                return Err(SongError::NotAuthenticated);
            }
            self.reload_inner(target)?;
            *self.mode.lock() = target;
            diagnostics::log(format!("storage switched to {:?}", target));
            Ok(())
        })();
        self.switching.store(false, Ordering::SeqCst);
        result
    }

    /// Copies a song from the active backend into the other one. The source
    /// record is left untouched; audio is re-homed to match the destination.
    pub fn transfer_song(&self, id: &str) -> SongResult<()> {
        let song = self.get(id).ok_or_else(|| SongError::NotFound(id.to_string()))?;
        match self.mode() {
            StorageMode::Local => {
                if !self.remote.is_authenticated() {
                    return Err(SongError::NotAuthenticated);
                }
                let mut copy = song;
                copy.is_example = false;
                if let Some(reference) = copy.audio_file_url.clone() {
                    // An already-remote URL is reused as-is.
                    if !is_remote_ref(&reference) {
                        let bytes = self.blobs.read(&reference)?;
                        let name = copy
                            .audio_file_name
                            .clone()
                            .unwrap_or_else(|| "audio".to_string());
                        let url = self.remote.upload_audio(&name, &bytes)?;
                        copy.audio_file_url = Some(url);
                    }
                }
                self.remote.create(&copy)?;
            }
            StorageMode::Remote => {
                let mut copy = song;
                copy.id = ids::new_local_id("song");
                copy.is_example = false;
                if let Some(reference) = copy.audio_file_url.clone() {
                    if is_remote_ref(&reference) {
                        let bytes = self.remote.download_audio(&reference)?;
                        copy.audio_file_url = Some(self.blobs.store(&bytes)?);
                    }
                }
                let mut data = self.local.load()?;
                data.songs.push(copy);
                self.local.save(&data)?;
            }
        }
        Ok(())
    }

    /// Queues the debounced persist of the whole in-memory list. Only
    /// meaningful in local mode with at least one non-example song and no
    /// load or switch in flight; the gate re-checks the flags at flush time.
    pub fn queue_autosave(&self) {
        if self.mode() != StorageMode::Local {
            return;
        }
        if self.switching.load(Ordering::SeqCst) || self.reloading.load(Ordering::SeqCst) {
            return;
        }
        if !self.songs.lock().iter().any(|s| !s.is_example) {
            return;
        }
        self.autosave.save(&self.snapshot_local());
    }

    /// Persists the in-memory list to the local store immediately.
    pub fn save_local_now(&self) -> SongResult<()> {
        Ok(self.autosave.save_immediate(&self.snapshot_local())?)
    }

    /// Flushes any pending debounced list write.
    pub fn flush(&self) -> SongResult<()> {
        Ok(self.autosave.flush()?)
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Forces the switch-in-flight flag. Test hook for exercising the
    /// re-entrancy guard without a second thread.
    #[doc(hidden)]
    pub fn set_switch_in_flight(&self, in_flight: bool) {
        self.switching.store(in_flight, Ordering::SeqCst);
    }
}
