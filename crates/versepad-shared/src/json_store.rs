//! Atomic JSON file persistence with backup rotation.
//!
//! Every versepad store (notepad buffer, open tabs, local song list) keeps a
//! single JSON document on disk. Writes go through a temp file + rename, the
//! previous generation is rotated to `.bak`/`.bak.1`/`.bak.2`, and a corrupt
//! primary file falls back to the newest parseable backup on load.

use std::fs;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store: {0}")]
    Read(String),
    #[error("failed to write store: {0}")]
    Write(String),
    #[error("failed to parse store: {0}")]
    Parse(String),
    #[error("failed to serialize store: {0}")]
    Serialize(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A single JSON document on disk, typed by its snapshot struct.
pub struct JsonFile<T> {
    path: PathBuf,
    _snapshot: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _snapshot: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for JsonFile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFile").field("path", &self.path).finish()
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _snapshot: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot. A missing file yields `T::default()`; a corrupt
    /// primary file falls back to the newest parseable backup.
    pub fn load(&self) -> StoreResult<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| StoreError::Read(e.to_string()))?;
        match serde_json::from_str::<T>(&data) {
            Ok(snapshot) => Ok(snapshot),
            Err(parse_err) => {
                if let Some(snapshot) = self.load_from_backup() {
                    log::warn!(
                        "recovered {} from backup after parse failure: {}",
                        self.path.display(),
                        parse_err
                    );
                    return Ok(snapshot);
                }
                Err(StoreError::Parse(parse_err.to_string()))
            }
        }
    }

    fn load_from_backup(&self) -> Option<T> {
        for ext in ["json.bak", "json.bak.1", "json.bak.2"] {
            let backup = self.path.with_extension(ext);
            if !backup.exists() {
                continue;
            }
            let data = fs::read_to_string(&backup).ok()?;
            if let Ok(snapshot) = serde_json::from_str::<T>(&data) {
                return Some(snapshot);
            }
        }
        None
    }

    /// Atomically writes the snapshot, rotating the previous generation into
    /// the backup chain first.
    pub fn save(&self, snapshot: &T) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write(e.to_string()))?;
        }
        self.rotate_backups();
        let tmp_path = self.path.with_extension("json.tmp");
        let file = fs::File::create(&tmp_path).map_err(|e| StoreError::Write(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        writer.flush().map_err(|e| StoreError::Write(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    fn rotate_backups(&self) {
        if !self.path.exists() {
            return;
        }

        let bak2 = self.path.with_extension("json.bak.2");
        let bak1 = self.path.with_extension("json.bak.1");
        let bak = self.path.with_extension("json.bak");

        let _ = fs::remove_file(&bak2);
        if bak1.exists() {
            let _ = fs::rename(&bak1, &bak2);
        }
        if bak.exists() {
            let _ = fs::rename(&bak, &bak1);
        }
        let _ = fs::rename(&self.path, &bak);
    }
}
