//! Remote backend contract.
//!
//! The editor consumes this trait and never looks behind it: authentication
//! is an opaque bearer credential attached by whoever constructed the store,
//! and a 401 surfaces as [`SongError::NotAuthenticated`] without any token
//! refresh here.

use crate::error::SongResult;
use crate::model::SongRecord;

pub trait RemoteStore: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn list(&self) -> SongResult<Vec<SongRecord>>;
    fn get(&self, id: &str) -> SongResult<SongRecord>;
    /// Creates the record remotely and returns the server-assigned id.
    fn create(&self, song: &SongRecord) -> SongResult<String>;
    fn update(&self, id: &str, song: &SongRecord) -> SongResult<()>;
    fn delete(&self, id: &str) -> SongResult<()>;

    /// Uploads audio bytes and returns the remote URL.
    fn upload_audio(&self, file_name: &str, bytes: &[u8]) -> SongResult<String>;
    fn download_audio(&self, url: &str) -> SongResult<Vec<u8>>;
    fn delete_audio(&self, url: &str) -> SongResult<()>;
}

pub mod memory {
    //! In-memory remote backend for tests and offline demos, with failure
    //! injection and a write counter so tests can assert that a code path
    //! produced no remote writes.

    use std::collections::HashMap;

    use parking_lot::Mutex;

    use versepad_shared::ids;

    use crate::error::{SongError, SongResult};
    use crate::model::SongRecord;

    use super::RemoteStore;

    #[derive(Default)]
    struct Inner {
        songs: Vec<SongRecord>,
        audio: HashMap<String, Vec<u8>>,
        authenticated: bool,
        fail_deletes: bool,
        fail_writes: bool,
        writes: usize,
    }

    #[derive(Default)]
    pub struct MemoryRemote {
        inner: Mutex<Inner>,
    }

    impl MemoryRemote {
        /// An authenticated, empty remote.
        pub fn new() -> Self {
            let remote = Self::default();
            remote.inner.lock().authenticated = true;
            remote
        }

        /// A remote with no session; every authenticated call fails.
        pub fn signed_out() -> Self {
            Self::default()
        }

        pub fn set_authenticated(&self, authenticated: bool) {
            self.inner.lock().authenticated = authenticated;
        }

        /// Makes subsequent `delete` calls fail.
        pub fn fail_deletes(&self, fail: bool) {
            self.inner.lock().fail_deletes = fail;
        }

        /// Makes subsequent `create`/`update`/`upload_audio` calls fail.
        pub fn fail_writes(&self, fail: bool) {
            self.inner.lock().fail_writes = fail;
        }

        /// Number of mutating calls (create/update/delete/upload) observed.
        pub fn write_count(&self) -> usize {
            self.inner.lock().writes
        }

        pub fn seed(&self, song: SongRecord) {
            self.inner.lock().songs.push(song);
        }

        pub fn songs(&self) -> Vec<SongRecord> {
            self.inner.lock().songs.clone()
        }

        pub fn audio_bytes(&self, url: &str) -> Option<Vec<u8>> {
            self.inner.lock().audio.get(url).cloned()
        }

        pub fn put_audio(&self, url: &str, bytes: &[u8]) {
            self.inner.lock().audio.insert(url.to_string(), bytes.to_vec());
        }
    }

    fn check_auth(inner: &Inner) -> SongResult<()> {
        if inner.authenticated {
            Ok(())
        } else {
            Err(SongError::NotAuthenticated)
        }
    }

    impl RemoteStore for MemoryRemote {
        fn is_authenticated(&self) -> bool {
            self.inner.lock().authenticated
        }

        fn list(&self) -> SongResult<Vec<SongRecord>> {
            let inner = self.inner.lock();
            check_auth(&inner)?;
            Ok(inner.songs.clone())
        }

        fn get(&self, id: &str) -> SongResult<SongRecord> {
            let inner = self.inner.lock();
            check_auth(&inner)?;
            inner
                .songs
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| SongError::NotFound(id.to_string()))
        }

        fn create(&self, song: &SongRecord) -> SongResult<String> {
            let mut inner = self.inner.lock();
            check_auth(&inner)?;
            if inner.fail_writes {
                return Err(SongError::Remote("injected create failure".to_string()));
            }
            inner.writes += 1;
            let mut stored = song.clone();
            stored.id = ids::new_entity_id();
            let id = stored.id.clone();
            inner.songs.push(stored);
            Ok(id)
        }

        fn update(&self, id: &str, song: &SongRecord) -> SongResult<()> {
            let mut inner = self.inner.lock();
            check_auth(&inner)?;
            if inner.fail_writes {
                return Err(SongError::Remote("injected update failure".to_string()));
            }
            inner.writes += 1;
            let slot = inner
                .songs
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| SongError::NotFound(id.to_string()))?;
            *slot = song.clone();
            slot.id = id.to_string();
            Ok(())
        }

        fn delete(&self, id: &str) -> SongResult<()> {
            let mut inner = self.inner.lock();
            check_auth(&inner)?;
            if inner.fail_deletes {
                return Err(SongError::Remote("injected delete failure".to_string()));
            }
            inner.writes += 1;
            let before = inner.songs.len();
            inner.songs.retain(|s| s.id != id);
            if inner.songs.len() == before {
                return Err(SongError::NotFound(id.to_string()));
            }
            Ok(())
        }

        fn upload_audio(&self, file_name: &str, bytes: &[u8]) -> SongResult<String> {
            let mut inner = self.inner.lock();
            check_auth(&inner)?;
            if inner.fail_writes {
                return Err(SongError::Remote("injected upload failure".to_string()));
            }
            inner.writes += 1;
            let url = format!(
                "https://audio.example/{}/{}",
                ids::new_entity_id(),
                file_name
            );
            inner.audio.insert(url.clone(), bytes.to_vec());
            Ok(url)
        }

        fn download_audio(&self, url: &str) -> SongResult<Vec<u8>> {
            let inner = self.inner.lock();
            check_auth(&inner)?;
            inner
                .audio
                .get(url)
                .cloned()
                .ok_or_else(|| SongError::NotFound(url.to_string()))
        }

        fn delete_audio(&self, url: &str) -> SongResult<()> {
            let mut inner = self.inner.lock();
            check_auth(&inner)?;
            inner.writes += 1;
            inner.audio.remove(url);
            Ok(())
        }
    }
}
