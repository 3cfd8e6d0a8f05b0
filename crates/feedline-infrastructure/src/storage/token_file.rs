//! File-backed token store.

use super::atomic_json::{AtomicJsonError, AtomicJsonFile};
use crate::paths::FeedlinePaths;
use async_trait::async_trait;
use feedline_core::error::{FeedlineError, Result};
use feedline_core::session::{PersistedTokens, TokenStore};
use std::path::{Path, PathBuf};

impl From<AtomicJsonError> for FeedlineError {
    fn from(err: AtomicJsonError) -> Self {
        match err {
            AtomicJsonError::Io(err) => err.into(),
            AtomicJsonError::Json(err) => err.into(),
        }
    }
}

/// Keeps the session tokens in a single `tokens.json`.
///
/// The four values are written as one document, replaced atomically, and
/// removed together by deleting the file. On Unix the file is readable by
/// its owner only.
pub struct FileTokenStore {
    file: AtomicJsonFile<PersistedTokens>,
}

impl FileTokenStore {
    /// Creates a store at `<data_dir>/tokens.json`, or under the platform
    /// data directory when `data_dir` is `None`.
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let path = FeedlinePaths::tokens_file(data_dir)
            .map_err(|e| FeedlineError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a store with a custom file path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path).private(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<PersistedTokens>> {
        let tokens = self.file.load().await?;
        tracing::debug!(
            path = %self.path().display(),
            present = tokens.is_some(),
            "Loaded persisted tokens"
        );
        Ok(tokens)
    }

    async fn save(&self, tokens: &PersistedTokens) -> Result<()> {
        self.file.save(tokens).await.map_err(|err| {
            FeedlineError::storage(format!(
                "Failed to write {}: {}",
                self.path().display(),
                err
            ))
        })?;
        tracing::debug!(user_id = tokens.user_id, "Persisted session tokens");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.file.remove().await?;
        tracing::debug!(path = %self.path().display(), "Removed persisted tokens");
        Ok(())
    }
}
