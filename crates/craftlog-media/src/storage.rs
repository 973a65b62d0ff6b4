//! Local filesystem storage under the public static root.
//!
//! Keys are paths relative to the root; the recorded image paths are these
//! keys, so an external HTTP layer can serve them as static assets.

use std::path::{Path, PathBuf};

use craftlog_core::{AppError, AppResult};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    /// Create the store, ensuring the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(LocalMediaStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the root.
    fn key_to_path(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(AppError::Validation(format!("invalid storage key: {}", key)));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    pub async fn write(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        tracing::debug!(key = %key, size_bytes = data.len(), "media file written");
        Ok(())
    }

    /// Delete a file. A missing file is not an error, so repeated deletes of
    /// the same key succeed.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.key_to_path(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }
        fs::remove_file(&path).await?;
        tracing::debug!(key = %key, "media file deleted");
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::NotFound(key.to_string()));
        }
        Ok(fs::read(&path).await?)
    }
}
