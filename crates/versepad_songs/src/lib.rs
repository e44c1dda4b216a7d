//! Song storage for versepad: data model, draft registry, local and remote
//! backends, audio blobs, and the collection manager that mediates between
//! them.

pub mod blobs;
pub mod drafts;
pub mod error;
pub mod http;
pub mod library;
pub mod local;
pub mod model;
pub mod remote;

pub use error::{SongError, SongResult};
pub use library::SongLibrary;
pub use model::{DraftSnapshot, SongRecord, StorageMode};
pub use remote::RemoteStore;
