//! File snapshot backend.
//!
//! Each document lives at `{dir}/{key}.json`. Writes go to
//! `{dir}/{key}.json.tmp` first and are renamed into place, so a reader
//! sees either the previous document or the new one, never a torn write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::error::DbError;

/// A directory of JSON documents.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DbError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// The directory documents are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Serialize `value` as pretty JSON and atomically replace `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Io`] if the temporary write or the rename fails.
    pub async fn write_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let body = serde_json::to_vec_pretty(value)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, body).await.map_err(|e| DbError::io(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| DbError::io(&path, e))?;
        Ok(())
    }

    /// Read and deserialize `key`. A missing document reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] on any read failure other than not-found.
    /// Returns [`DbError::Serialization`] if the document is not valid JSON.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DbError::io(path, e)),
        }
    }
}
