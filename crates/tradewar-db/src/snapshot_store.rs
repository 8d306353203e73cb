//! The persistence boundary the snapshot publisher writes through.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dragonfly::DragonflyPool;
use crate::error::DbError;
use crate::file::FileStore;

/// Key of the full denormalized snapshot.
pub const STATE_KEY: &str = "state";

/// Key of the recent-events list.
pub const EVENTS_KEY: &str = "events";

/// Where published documents go. One backend per process.
#[derive(Clone)]
pub enum SnapshotStore {
    /// JSON files in the shared directory.
    File(FileStore),
    /// A `Dragonfly`/Redis instance.
    Dragonfly(DragonflyPool),
}

impl SnapshotStore {
    /// Open the file backend in `shared_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory cannot be created.
    pub async fn file(shared_dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        Ok(Self::File(FileStore::open(shared_dir).await?))
    }

    /// Connect the `Dragonfly` backend.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the URL is invalid or the connection fails.
    pub async fn dragonfly(url: &str) -> Result<Self, DbError> {
        Ok(Self::Dragonfly(DragonflyPool::connect(url).await?))
    }

    /// Backend name reported in `system_health`.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Dragonfly(_) => "redis",
        }
    }

    /// Replace the document at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the backend write fails.
    pub async fn write<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        match self {
            Self::File(store) => store.write_json(key, value).await,
            Self::Dragonfly(pool) => pool.set_json(key, value).await,
        }
    }

    /// Read the document at `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read or deserialization fails.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        match self {
            Self::File(store) => store.read_json(key).await,
            Self::Dragonfly(pool) => pool.get_json(key).await,
        }
    }
}
