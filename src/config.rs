//! Index configuration

use std::path::{Path, PathBuf};

use crate::utils::environment::{SAVE_ON_CHANGE_ENV, env_flag};

/// Cache subdirectory beneath the project root
pub const DEFAULT_CACHE_DIR: &str = "PrefabCache";

/// File extension of indexed assets
pub const DEFAULT_ASSET_EXTENSION: &str = "prefab";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Root every asset key is relative to
    pub project_root: PathBuf,
    /// Store directory, relative to `project_root`
    pub cache_dir: PathBuf,
    /// Extension (without the dot) of the files to index
    pub asset_extension: String,
    /// Save the store after every `on_asset_changed` instead of only at lifecycle flushes
    pub persist_on_every_change: bool,
}

impl IndexConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            asset_extension: DEFAULT_ASSET_EXTENSION.to_string(),
            persist_on_every_change: false,
        }
    }

    /// Defaults plus the user preferences found in the environment
    pub fn from_env(project_root: impl Into<PathBuf>) -> Self {
        Self::new(project_root).with_persist_on_every_change(env_flag(SAVE_ON_CHANGE_ENV))
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_asset_extension(mut self, extension: &str) -> Self {
        self.asset_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_persist_on_every_change(mut self, enabled: bool) -> Self {
        self.persist_on_every_change = enabled;
        self
    }

    /// Absolute location of the store directory
    pub fn cache_path(&self) -> PathBuf {
        self.project_root.join(&self.cache_dir)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}
