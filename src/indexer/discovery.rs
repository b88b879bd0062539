use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::models::AssetPath;
use crate::utils::{asset_key, resolve_asset};

/// Where the manager gets its assets from
///
/// The host implements this to enumerate tracked assets and hand over their text.
/// [`FsAssetSource`] covers the common case of a project directory on disk.
pub trait AssetSource: Send + Sync {
    /// Every currently known asset
    fn list_assets(&self) -> Result<Vec<AssetPath>>;

    /// Current text content of one asset
    fn read_asset(&self, asset: &str) -> Result<String>;
}

/// Asset source walking a project directory for files with the configured extension
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
    cache_dir: PathBuf,
    extension: String,
}

impl FsAssetSource {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            root: config.project_root.clone(),
            cache_dir: config.cache_path(),
            extension: config.asset_extension.clone(),
        }
    }

    fn is_asset(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()))
    }

    /// Skip the store directory and hidden or `~`-suffixed folders, which hold no assets
    fn is_walkable(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if entry.path() == self.cache_dir {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        !(name.starts_with('.') || name.ends_with('~'))
    }
}

impl AssetSource for FsAssetSource {
    /// Walk the project root and collect asset keys, sorted
    ///
    /// Unreadable directory entries are logged and skipped; a missing root is an error.
    fn list_assets(&self) -> Result<Vec<AssetPath>> {
        if !self.root.is_dir() {
            return Err(IndexError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "project root not found"),
            ));
        }

        let mut assets = Vec::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|e| self.is_walkable(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry during asset discovery: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_asset(entry.path()) {
                continue;
            }

            match asset_key(&self.root, entry.path()) {
                Some(key) => assets.push(key),
                None => {
                    log::warn!("Skipping asset outside project root: {}", entry.path().display())
                }
            }
        }

        assets.sort();
        log::debug!("Discovered {} assets under {}", assets.len(), self.root.display());
        Ok(assets)
    }

    /// Invalid UTF-8 is replaced rather than rejected; only I/O failures are errors
    fn read_asset(&self, asset: &str) -> Result<String> {
        let path = resolve_asset(&self.root, asset);
        let bytes = fs::read(&path).map_err(|e| IndexError::io(path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
