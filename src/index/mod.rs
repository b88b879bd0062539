//! Bidirectional asset/GUID reference index
//!
//! Holds the forward map (asset -> GUIDs) and the reverse map (GUID -> assets) and keeps
//! them mutually consistent: `g` is in `forward[a]` exactly when `a` is in `reverse[g]`.
//!
//! - A scanned asset always has a forward entry, possibly empty.
//! - A GUID only has a reverse entry while at least one asset references it.
//!
//! All mutation goes through `&mut self`, so a caller can never observe the two maps
//! between halves of an update.

use std::collections::BTreeSet;

use crate::error::{IndexError, Result};
use crate::models::{AssetPath, ForwardIndex, Guid, IndexStats, ReverseIndex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    forward: ForwardIndex,
    reverse: ReverseIndex,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from two independently loaded maps
    ///
    /// Returns the mismatch description if the maps disagree, so the store can report
    /// which file pair is inconsistent.
    pub fn from_parts(
        forward: ForwardIndex,
        reverse: ReverseIndex,
    ) -> std::result::Result<Self, String> {
        if let Some((guid, _)) = reverse.iter().find(|(_, assets)| assets.is_empty()) {
            return Err(format!("GUID {guid} has an empty asset list"));
        }

        for (asset, guids) in &forward {
            for guid in guids {
                if !reverse.get(guid).is_some_and(|assets| assets.contains(asset)) {
                    return Err(format!(
                        "{asset} references {guid} but the reverse entry is missing"
                    ));
                }
            }
        }

        for (guid, assets) in &reverse {
            for asset in assets {
                if !forward.get(asset).is_some_and(|guids| guids.contains(guid)) {
                    return Err(format!(
                        "{guid} lists {asset} but the forward entry is missing"
                    ));
                }
            }
        }

        Ok(Self { forward, reverse })
    }

    /// Replace the GUID set of `asset` and reconcile the reverse map
    ///
    /// GUIDs the asset no longer references lose their link to it (and their reverse
    /// entry entirely once no asset is left); newly referenced GUIDs gain it.
    pub fn set_for_asset(&mut self, asset: &str, guids: BTreeSet<Guid>) {
        let previous = self.forward.remove(asset).unwrap_or_default();

        for stale in previous.difference(&guids) {
            self.unlink(stale, asset);
        }

        for added in guids.difference(&previous) {
            self.reverse.entry(added.clone()).or_default().insert(asset.to_string());
        }

        self.forward.insert(asset.to_string(), guids);
    }

    /// Forget `asset` entirely. Returns false if it was never indexed.
    pub fn remove_asset(&mut self, asset: &str) -> bool {
        let Some(previous) = self.forward.remove(asset) else {
            return false;
        };

        for guid in &previous {
            self.unlink(guid, asset);
        }

        true
    }

    fn unlink(&mut self, guid: &str, asset: &str) {
        if let Some(assets) = self.reverse.get_mut(guid) {
            assets.remove(asset);
            if assets.is_empty() {
                self.reverse.remove(guid);
            }
        }
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// GUIDs referenced by `asset`
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::AssetNotFound`] if the asset has never been scanned.
    pub fn identifiers_of(&self, asset: &str) -> Result<&BTreeSet<Guid>> {
        self.forward.get(asset).ok_or_else(|| IndexError::AssetNotFound(asset.to_string()))
    }

    /// Assets referencing `guid`
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::GuidNotFound`] if no indexed asset references the GUID.
    pub fn assets_referencing(&self, guid: &str) -> Result<&BTreeSet<AssetPath>> {
        self.reverse.get(guid).ok_or_else(|| IndexError::GuidNotFound(guid.to_string()))
    }

    pub fn forward(&self) -> &ForwardIndex {
        &self.forward
    }

    pub fn reverse(&self) -> &ReverseIndex {
        &self.reverse
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            assets: self.forward.len(),
            guids: self.reverse.len(),
            links: self.forward.values().map(BTreeSet::len).sum(),
        }
    }
}
