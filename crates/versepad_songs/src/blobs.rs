//! Local audio blob storage.
//!
//! Audio attached to a local song lives as a file under `<root>/blobs/` and
//! is referenced from the song record as `local:<id>`. Remote audio is
//! referenced by its URL; [`is_remote_ref`] tells the two apart.

use std::fs;
use std::path::{Path, PathBuf};

use versepad_shared::ids;

use crate::error::{SongError, SongResult};

pub const LOCAL_REF_PREFIX: &str = "local:";

/// True when an audio reference points at the remote object store.
pub fn is_remote_ref(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn open_at(root: &Path) -> Self {
        Self {
            dir: root.join("blobs"),
        }
    }

    /// Stores `bytes` under a fresh id and returns the `local:<id>` ref.
    pub fn store(&self, bytes: &[u8]) -> SongResult<String> {
        fs::create_dir_all(&self.dir).map_err(|e| SongError::Audio(e.to_string()))?;
        let id = ids::new_local_id("audio");
        let path = self.dir.join(&id);
        fs::write(&path, bytes).map_err(|e| SongError::Audio(e.to_string()))?;
        Ok(format!("{}{}", LOCAL_REF_PREFIX, id))
    }

    pub fn read(&self, reference: &str) -> SongResult<Vec<u8>> {
        let path = self.path_for(reference)?;
        fs::read(&path).map_err(|e| SongError::Audio(e.to_string()))
    }

    pub fn delete(&self, reference: &str) -> SongResult<()> {
        let path = self.path_for(reference)?;
        fs::remove_file(&path).map_err(|e| SongError::Audio(e.to_string()))
    }

    fn path_for(&self, reference: &str) -> SongResult<PathBuf> {
        let id = reference
            .strip_prefix(LOCAL_REF_PREFIX)
            .ok_or_else(|| SongError::Audio(format!("not a local audio ref: {}", reference)))?;
        if id.is_empty() || id.contains('/') || id.contains("..") {
            return Err(SongError::Audio(format!("invalid audio ref: {}", reference)));
        }
        Ok(self.dir.join(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_read_delete_roundtrip() {
        let temp = TempDir::new().unwrap();
        let blobs = BlobStore::open_at(temp.path());
        let reference = blobs.store(b"riff").unwrap();
        assert!(reference.starts_with(LOCAL_REF_PREFIX));
        assert_eq!(blobs.read(&reference).unwrap(), b"riff");
        blobs.delete(&reference).unwrap();
        assert!(blobs.read(&reference).is_err());
    }

    #[test]
    fn test_remote_refs_are_rejected() {
        let temp = TempDir::new().unwrap();
        let blobs = BlobStore::open_at(temp.path());
        assert!(blobs.read("https://audio.example/x").is_err());
        assert!(is_remote_ref("https://audio.example/x"));
        assert!(!is_remote_ref("local:audio-1-ab"));
    }

    #[test]
    fn test_traversal_refs_are_rejected() {
        let temp = TempDir::new().unwrap();
        let blobs = BlobStore::open_at(temp.path());
        assert!(blobs.read("local:../escape").is_err());
    }
}
