//! Shared plumbing for the versepad crates: file diagnostics, id and text
//! helpers, and the JSON persistence layer (atomic store + debounced wrapper)
//! the notepad/tabs/songs stores all sit on.

pub mod debounce;
pub mod diagnostics;
pub mod ids;
pub mod json_store;
pub mod text;

pub use debounce::Debounced;
pub use json_store::{JsonFile, StoreError, StoreResult};

use std::path::{Path, PathBuf};

/// Root directory for all persisted versepad state (`~/.versepad`).
pub fn default_storage_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| Path::new("/").to_path_buf())
        .join(".versepad")
}

/// Per-profile state directory under the storage root.
pub fn profile_dir(root: &Path, profile: &str) -> PathBuf {
    root.join("profiles").join(profile)
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i128 {
    (time::OffsetDateTime::now_utc() - time::OffsetDateTime::UNIX_EPOCH).whole_milliseconds()
}
