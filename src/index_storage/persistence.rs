//! Cache persistence: load/save with atomic writes

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{IndexError, Result};
use crate::index::ReferenceIndex;
use crate::models::{ForwardIndex, ReverseIndex};

const FORWARD_FILENAME: &str = "PrefabToGUID.json";
const REVERSE_FILENAME: &str = "GUIDToPrefab.json";

/// Two-file JSON store for a [`ReferenceIndex`]
#[derive(Debug, Clone)]
pub struct IndexStore {
    cache_dir: PathBuf,
}

impl IndexStore {
    /// Store rooted at `cache_dir`; nothing is created until the first save
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into() }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path to the asset -> GUIDs file
    pub fn forward_path(&self) -> PathBuf {
        self.cache_dir.join(FORWARD_FILENAME)
    }

    /// Path to the GUID -> assets file
    pub fn reverse_path(&self) -> PathBuf {
        self.cache_dir.join(REVERSE_FILENAME)
    }

    /// Load the persisted index
    ///
    /// Returns `Ok(None)` if either file is missing (caller should rebuild).
    ///
    /// # Errors
    ///
    /// - [`IndexError::Io`] if a file cannot be checked for or read
    /// - [`IndexError::MalformedStore`] if a file does not parse as `string -> [string]`,
    ///   or the two files disagree (e.g. a crash between the two writes of a save)
    pub fn load(&self) -> Result<Option<ReferenceIndex>> {
        let forward_path = self.forward_path();
        let reverse_path = self.reverse_path();

        // Permission errors must not look like an absent store
        if !is_present(&forward_path)? || !is_present(&reverse_path)? {
            log::debug!("No complete index store in {}", self.cache_dir.display());
            return Ok(None);
        }

        let forward: ForwardIndex = read_json(&forward_path)?;
        let reverse: ReverseIndex = read_json(&reverse_path)?;

        let index = ReferenceIndex::from_parts(forward, reverse)
            .map_err(|reason| IndexError::malformed(&self.cache_dir, reason))?;

        let stats = index.stats();
        log::info!(
            "Loaded index store: {} assets, {} GUIDs from {}",
            stats.assets,
            stats.guids,
            self.cache_dir.display()
        );

        Ok(Some(index))
    }

    /// Save both halves of `index`, replacing any previous store
    ///
    /// Each file is written to a temp file and renamed into place, so a crash never leaves
    /// a half-written file. The pair as a whole is not atomic; [`IndexStore::load`] detects
    /// a mismatched pair.
    pub fn save(&self, index: &ReferenceIndex) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| IndexError::io(&self.cache_dir, e))?;

        write_json_atomic(&self.forward_path(), index.forward())?;
        write_json_atomic(&self.reverse_path(), index.reverse())?;

        log::debug!("Saved index store to {}", self.cache_dir.display());
        Ok(())
    }

    /// Delete both store files if present
    pub fn clear(&self) -> Result<()> {
        for path in [self.forward_path(), self.reverse_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(IndexError::io(path, e)),
            }
        }
        Ok(())
    }
}

fn is_present(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| IndexError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| IndexError::malformed(path, e.to_string()))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let temp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| IndexError::io(path, e.into()))?;
    fs::write(&temp, json).map_err(|e| IndexError::io(&temp, e))?;
    fs::rename(&temp, path).map_err(|e| IndexError::io(path, e))?;
    Ok(())
}
