//! Local song storage: the whole song list as one JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use versepad_shared::{profile_dir, JsonFile};

use crate::error::SongResult;
use crate::model::SongRecord;

fn default_schema_version() -> u32 {
    1
}

/// Persisted local library: song list plus the flag remembering that the
/// seeded example song was deliberately deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSongsFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub songs: Vec<SongRecord>,
    #[serde(default)]
    pub example_deleted: bool,
}

impl Default for LocalSongsFile {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            songs: Vec::new(),
            example_deleted: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    file: JsonFile<LocalSongsFile>,
}

impl LocalStore {
    pub fn open_at(root: &Path, profile: &str) -> Self {
        Self {
            file: JsonFile::new(profile_dir(root, profile).join("songs.json")),
        }
    }

    /// The underlying file, for wiring up debounced autosave.
    pub fn file(&self) -> &JsonFile<LocalSongsFile> {
        &self.file
    }

    /// Loads the library exactly as persisted.
    pub fn load(&self) -> SongResult<LocalSongsFile> {
        Ok(self.file.load()?)
    }

    /// Loads the library, seeding the example song into an empty list unless
    /// it was deleted on purpose earlier.
    pub fn load_or_seed(&self) -> SongResult<LocalSongsFile> {
        let mut data = self.load()?;
        if data.songs.is_empty() && !data.example_deleted {
            data.songs.push(example_song());
        }
        Ok(data)
    }

    pub fn save(&self, data: &LocalSongsFile) -> SongResult<()> {
        Ok(self.file.save(data)?)
    }

    pub fn clear(&self) -> SongResult<()> {
        self.save(&LocalSongsFile::default())
    }
}

/// The example song shown to first-time users.
pub fn example_song() -> SongRecord {
    let mut song = SongRecord::new(
        "Example: Paper Moon",
        "Paper moon above the harbor light\n\
         Folded from a page I wrote last night\n\
         \n\
         Every crease a line I couldn't say\n\
         Lift it to the wind and float away",
    );
    song.id = "example-paper-moon".to_string();
    song.is_example = true;
    song
}
