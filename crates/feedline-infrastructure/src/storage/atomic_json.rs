//! Atomic JSON file operations.
//!
//! Writes go to a hidden temp file in the same directory, are synced, then
//! renamed over the target, so readers see either the old or the new
//! document and never a partial one.

use serde::{Serialize, de::DeserializeOwned};
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Errors that can occur during atomic JSON operations.
#[derive(Debug, Error)]
pub enum AtomicJsonError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A handle to a JSON document that is replaced atomically on save.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    private: bool,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            private: false,
            _phantom: PhantomData,
        }
    }

    /// Restricts the file to its owner (mode 600) on Unix.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub async fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Serializes `data` and atomically replaces the file with it.
    pub async fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = self.create_temp(&tmp_path).await?;
        tmp_file.write_all(&json).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub async fn remove(&self) -> Result<(), AtomicJsonError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn create_temp(&self, tmp_path: &Path) -> io::Result<fs::File> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        if self.private {
            options.mode(0o600);
        }
        options.open(tmp_path).await
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let parent = self.path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
        })?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Doc>::new(temp_dir.path().join("doc.json"));

        assert!(file.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("doc.json");
        let file = AtomicJsonFile::new(path.clone());

        file.save(&Doc { name: "a".into(), count: 1 }).await.unwrap();
        file.save(&Doc { name: "b".into(), count: 2 }).await.unwrap();

        let loaded = file.load().await.unwrap().unwrap();
        assert_eq!(loaded, Doc { name: "b".into(), count: 2 });
        assert!(!temp_dir.path().join("nested").join(".doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        std::fs::write(&path, "{ invalid json").unwrap();

        let file = AtomicJsonFile::<Doc>::new(path);
        assert!(matches!(file.load().await, Err(AtomicJsonError::Json(_))));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let file = AtomicJsonFile::new(path.clone());
        file.save(&Doc { name: "a".into(), count: 1 }).await.unwrap();

        file.remove().await.unwrap();
        file.remove().await.unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_private_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let file = AtomicJsonFile::new(path.clone()).private();
        file.save(&Doc { name: "a".into(), count: 1 }).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
