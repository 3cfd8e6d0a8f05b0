//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `~/.config/feedline/config.toml` and applies
//! environment overrides on top.

use crate::paths::FeedlinePaths;
use feedline_core::config::ClientConfig;
use feedline_core::error::{FeedlineError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "FEEDLINE_API_URL";
/// Overrides `data_dir`.
pub const ENV_DATA_DIR: &str = "FEEDLINE_DATA_DIR";

/// Loads and caches the client configuration.
///
/// A missing file yields the defaults. A file that exists but does not parse
/// is an error from [`ConfigService::load`]; [`ConfigService::get_config`]
/// logs it and falls back to the defaults.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Uses the platform config file. If no config directory can be
    /// determined, only defaults and environment overrides apply.
    pub fn new() -> Self {
        let path = match FeedlinePaths::config_file() {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!("{}; using default configuration", err);
                None
            }
        };
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading a custom file (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> ClientConfig {
        if let Some(cached) = self.config.read().ok().and_then(|c| c.clone()) {
            return cached;
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to load configuration: {}; using defaults", err);
                apply_overrides(ClientConfig::default(), env_var)
            }
        };

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    /// Reads the file (if any) and applies environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let from_file = match &self.path {
            Some(path) => read_config_file(path)?,
            None => None,
        };
        Ok(apply_overrides(from_file.unwrap_or_default(), env_var))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config_file(path: &Path) -> Result<Option<ClientConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let config: ClientConfig = toml::from_str(&content).map_err(|err| {
        FeedlineError::config(format!("{}: {}", path.display(), err))
    })?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(Some(config))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Applies `FEEDLINE_API_URL` and `FEEDLINE_DATA_DIR` from `lookup`.
/// Empty values are ignored.
pub fn apply_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(dir) = non_empty(ENV_DATA_DIR) {
        config.data_dir = Some(PathBuf::from(dir));
    }
    config
}
