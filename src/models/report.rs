use serde::Serialize;

use super::reference::AssetPath;

/// An asset a full rebuild could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub path: AssetPath,
    pub reason: String,
}

/// Outcome of a full rebuild, kept by the manager for later inspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub scanned: usize,
    pub skipped: Vec<SkippedAsset>,
}

impl RebuildReport {
    pub fn total(&self) -> usize {
        self.scanned + self.skipped.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Size summary of an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Assets with a forward entry (including those with no references)
    pub assets: usize,
    /// GUIDs referenced by at least one asset
    pub guids: usize,
    /// Distinct asset/GUID pairs
    pub links: usize,
}
