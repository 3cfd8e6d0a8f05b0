//! Platform paths for Feedline files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/feedline/          # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/feedline/     # Data directory (overridable)
//! └── tokens.json              # Persisted session tokens (0600)
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "feedline";
const CONFIG_FILE: &str = "config.toml";
const TOKENS_FILE: &str = "tokens.json";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// No platform config/data directory could be determined.
    #[error("Cannot determine the {0} directory for this platform")]
    DirNotFound(&'static str),
}

/// Resolves where Feedline keeps its files.
pub struct FeedlinePaths;

impl FeedlinePaths {
    /// Returns the Feedline configuration directory (e.g. `~/.config/feedline/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Returns the Feedline data directory (e.g. `~/.local/share/feedline/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("data"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Returns the path to `tokens.json`, under `data_dir` when given and the
    /// platform data directory otherwise.
    ///
    /// # Security Note
    ///
    /// The file holds bearer credentials. The token store creates it with
    /// mode 600 on Unix.
    pub fn tokens_file(data_dir: Option<&Path>) -> Result<PathBuf, PathError> {
        let dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::data_dir()?,
        };
        Ok(dir.join(TOKENS_FILE))
    }
}
