//! Index lifecycle: load or rebuild, incremental updates, and flushes to the store.
//!
//! The manager is an explicitly constructed value owning its index. Hosts wire their own
//! events to its public methods:
//!
//! - startup -> [`IndexManager::initialize`]
//! - an asset was saved -> [`IndexManager::on_asset_changed`]
//! - an asset was deleted -> [`IndexManager::on_asset_removed`]
//! - shutdown or a reload of the host -> [`IndexManager::on_shutdown_or_rebuild_trigger`]
//!
//! All methods take `&self`/`&mut self`; a host serving concurrent callers must put the
//! whole manager behind one lock so the two index maps are never seen mid-update.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::index::ReferenceIndex;
use crate::index_storage::IndexStore;
use crate::indexer::discovery::{AssetSource, FsAssetSource};
use crate::models::{AssetPath, Guid, IndexStats, RebuildReport, SkippedAsset};
use crate::scanner::scan_content;

/// Lifecycle state of an [`IndexManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Nothing loaded yet
    Uninitialized,
    /// Mappings installed, but the store has not been confirmed (initial save failed)
    Loaded,
    /// Initialized; queries are allowed
    Ready,
}

pub struct IndexManager<S: AssetSource = FsAssetSource> {
    config: IndexConfig,
    source: S,
    store: IndexStore,
    index: ReferenceIndex,
    state: ManagerState,
    last_rebuild: Option<RebuildReport>,
    dirty: bool,
}

impl IndexManager<FsAssetSource> {
    /// Manager over the project directory named by `config`
    pub fn open(config: IndexConfig) -> Self {
        let source = FsAssetSource::new(&config);
        Self::new(config, source)
    }
}

impl<S: AssetSource> IndexManager<S> {
    pub fn new(config: IndexConfig, source: S) -> Self {
        let store = IndexStore::new(config.cache_path());
        Self {
            config,
            source,
            store,
            index: ReferenceIndex::new(),
            state: ManagerState::Uninitialized,
            last_rebuild: None,
            dirty: false,
        }
    }

    /// Load the store, or rebuild from all assets if it is missing
    ///
    /// # Errors
    ///
    /// - [`IndexError::MalformedStore`] if a store exists but is corrupt or inconsistent.
    ///   The store is left untouched; the caller decides whether to discard it.
    /// - [`IndexError::Io`] if the store or asset enumeration fails
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            ManagerState::Ready => {
                log::warn!("initialize() called on an already initialized index");
                return Ok(());
            }
            // A previous attempt installed the mappings but could not persist them
            ManagerState::Loaded => self.persist()?,
            ManagerState::Uninitialized => match self.store.load()? {
                Some(index) => {
                    self.index = index;
                    self.dirty = false;
                    self.state = ManagerState::Loaded;
                }
                None => {
                    log::info!(
                        "No index store in {}, running full rebuild",
                        self.store.cache_dir().display()
                    );
                    self.full_rebuild()?;
                }
            },
        }

        self.state = ManagerState::Ready;
        Ok(())
    }

    /// Discard the in-memory index and rescan every known asset
    ///
    /// Assets that cannot be read are skipped and recorded in the returned report; they
    /// do not abort the rebuild. Ends by saving the store.
    pub fn full_rebuild(&mut self) -> Result<RebuildReport> {
        let assets = self.source.list_assets()?;
        let total = assets.len();

        let source = &self.source;
        let scanned: Vec<(AssetPath, Result<BTreeSet<Guid>>)> = assets
            .into_par_iter()
            .map(|asset| {
                let guids = source.read_asset(&asset).map(|content| scan_content(&content));
                (asset, guids)
            })
            .collect();

        self.index.clear();
        let mut report = RebuildReport::default();

        for (processed, (asset, guids)) in scanned.into_iter().enumerate() {
            match guids {
                Ok(guids) => {
                    self.index.set_for_asset(&asset, guids);
                    report.scanned += 1;
                }
                Err(e) => {
                    log::warn!("Skipping unreadable asset {}: {}", asset, e);
                    // Its previous entry can no longer be verified
                    self.index.remove_asset(&asset);
                    report.skipped.push(SkippedAsset { path: asset, reason: e.to_string() });
                }
            }
            log::debug!("Processed {} out of {} assets", processed + 1, total);
        }

        log::info!(
            "Indexed {} assets ({} skipped), {} GUIDs referenced",
            report.scanned,
            report.skipped.len(),
            self.index.stats().guids
        );

        if self.state == ManagerState::Uninitialized {
            self.state = ManagerState::Loaded;
        }
        self.dirty = true;
        self.last_rebuild = Some(report.clone());

        self.persist()?;
        Ok(report)
    }

    /// Full rebuild requested by the user; leaves the manager ready to query
    pub fn force_full_rebuild(&mut self) -> Result<RebuildReport> {
        let report = self.full_rebuild()?;
        self.state = ManagerState::Ready;
        Ok(report)
    }

    /// Rescan one asset after the host saved it
    ///
    /// Saves immediately when `persist_on_every_change` is set; otherwise the change is
    /// flushed by the next [`IndexManager::on_shutdown_or_rebuild_trigger`].
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the asset cannot be read (the index is unchanged), or
    /// [`IndexError::NotReady`] before initialization.
    pub fn on_asset_changed(&mut self, asset: &str) -> Result<()> {
        self.ensure_loaded()?;

        let content = self.source.read_asset(asset)?;
        let guids = scan_content(&content);
        log::debug!("Rescanned {}: {} GUIDs", asset, guids.len());

        self.index.set_for_asset(asset, guids);
        self.dirty = true;

        if self.config.persist_on_every_change {
            self.persist()?;
        }
        Ok(())
    }

    /// Drop a deleted asset from the index. Returns false if it was not indexed.
    pub fn on_asset_removed(&mut self, asset: &str) -> Result<bool> {
        self.ensure_loaded()?;

        let removed = self.index.remove_asset(asset);
        if removed {
            log::debug!("Removed {} from index", asset);
            self.dirty = true;
            if self.config.persist_on_every_change {
                self.persist()?;
            }
        }
        Ok(removed)
    }

    /// Flush the index to the store regardless of `persist_on_every_change`
    ///
    /// Call before process exit and before anything that invalidates in-memory state.
    pub fn on_shutdown_or_rebuild_trigger(&mut self) -> Result<()> {
        if self.state == ManagerState::Uninitialized {
            log::debug!("Index never initialized, nothing to flush");
            return Ok(());
        }
        self.persist()
    }

    /// GUIDs referenced by `asset`; empty if the asset was never scanned
    pub fn identifiers_of(&self, asset: &str) -> Result<BTreeSet<Guid>> {
        self.ensure_ready()?;
        not_found_as_empty(self.index.identifiers_of(asset))
    }

    /// Assets referencing `guid`; empty if none does
    pub fn assets_referencing(&self, guid: &str) -> Result<BTreeSet<AssetPath>> {
        self.ensure_ready()?;
        not_found_as_empty(self.index.assets_referencing(guid))
    }

    pub fn stats(&self) -> Result<IndexStats> {
        self.ensure_ready()?;
        Ok(self.index.stats())
    }

    /// Read access to the underlying index
    pub fn index(&self) -> Result<&ReferenceIndex> {
        self.ensure_ready()?;
        Ok(&self.index)
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Report of the most recent full rebuild in this session, if any
    pub fn last_rebuild(&self) -> Option<&RebuildReport> {
        self.last_rebuild.as_ref()
    }

    /// True when the index has changes the store does not have yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.index)?;
        self.dirty = false;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            ManagerState::Ready => Ok(()),
            _ => Err(IndexError::NotReady),
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            ManagerState::Uninitialized => Err(IndexError::NotReady),
            _ => Ok(()),
        }
    }
}

fn not_found_as_empty<T: Clone + Ord>(result: Result<&BTreeSet<T>>) -> Result<BTreeSet<T>> {
    match result {
        Ok(set) => Ok(set.clone()),
        Err(e) if e.is_not_found() => Ok(BTreeSet::new()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    /// In-memory asset source; `None` content simulates an unreadable asset
    #[derive(Default)]
    struct MemorySource {
        assets: Mutex<HashMap<String, Option<String>>>,
    }

    impl MemorySource {
        fn with(assets: &[(&str, Option<&str>)]) -> Self {
            let source = Self::default();
            for (path, content) in assets {
                source.put(path, *content);
            }
            source
        }

        fn put(&self, path: &str, content: Option<&str>) {
            self.assets.lock().unwrap().insert(path.to_string(), content.map(str::to_string));
        }
    }

    impl AssetSource for MemorySource {
        fn list_assets(&self) -> Result<Vec<AssetPath>> {
            let mut assets: Vec<_> = self.assets.lock().unwrap().keys().cloned().collect();
            assets.sort();
            Ok(assets)
        }

        fn read_asset(&self, asset: &str) -> Result<String> {
            match self.assets.lock().unwrap().get(asset) {
                Some(Some(content)) => Ok(content.clone()),
                _ => Err(IndexError::io(
                    asset,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "unreadable"),
                )),
            }
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn manager(temp: &TempDir, source: MemorySource) -> IndexManager<MemorySource> {
        IndexManager::new(IndexConfig::new(temp.path()), source)
    }

    #[test]
    fn test_queries_before_initialize_are_not_ready() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp, MemorySource::default());

        assert!(matches!(manager.identifiers_of("A"), Err(IndexError::NotReady)));
        assert!(matches!(manager.assets_referencing("g"), Err(IndexError::NotReady)));
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn test_change_before_initialize_is_not_ready() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));

        assert!(matches!(manager.on_asset_changed("A"), Err(IndexError::NotReady)));
    }

    #[test]
    fn test_initialize_without_store_rebuilds_and_saves() {
        let temp = TempDir::new().unwrap();
        let source = MemorySource::with(&[
            ("A", Some("m_Script: {fileID: 1, guid: g1, type: 3}")),
            ("B", Some("m_Mesh: {fileID: 2, guid: g1, type: 2}\nx: {guid: g2, type: 2}")),
        ]);
        let mut manager = manager(&temp, source);

        manager.initialize().unwrap();

        assert_eq!(manager.state(), ManagerState::Ready);
        assert_eq!(manager.assets_referencing("g1").unwrap(), set(&["A", "B"]));
        assert_eq!(manager.last_rebuild().unwrap().scanned, 2);
        assert!(manager.store().load().unwrap().is_some());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_initialize_prefers_existing_store() {
        let temp = TempDir::new().unwrap();
        let mut stored = ReferenceIndex::new();
        stored.set_for_asset("Stored", set(&["gs"]));
        IndexStore::new(IndexConfig::new(temp.path()).cache_path()).save(&stored).unwrap();

        // The source disagrees with the store; loading must not rescan
        let mut manager = manager(&temp, MemorySource::with(&[("Fresh", Some("guid: gf,"))]));
        manager.initialize().unwrap();

        assert_eq!(manager.identifiers_of("Stored").unwrap(), set(&["gs"]));
        assert!(manager.identifiers_of("Fresh").unwrap().is_empty());
        assert!(manager.last_rebuild().is_none());
    }

    #[test]
    fn test_initialize_surfaces_malformed_store() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(IndexConfig::new(temp.path()).cache_path());
        std::fs::create_dir_all(store.cache_dir()).unwrap();
        std::fs::write(store.forward_path(), "[]").unwrap();
        std::fs::write(store.reverse_path(), "{}").unwrap();

        let mut manager = manager(&temp, MemorySource::default());
        let result = manager.initialize();

        assert!(matches!(result, Err(IndexError::MalformedStore { .. })));
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn test_rebuild_skips_unreadable_asset_and_records_it() {
        let temp = TempDir::new().unwrap();
        let source = MemorySource::with(&[
            ("A", Some("guid: g1,")),
            ("B", None),
            ("C", Some("guid: g3,")),
        ]);
        let mut manager = manager(&temp, source);
        manager.initialize().unwrap();

        let report = manager.last_rebuild().unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "B");
        assert_eq!(report.total(), 3);
        assert!(report.has_failures());

        assert_eq!(manager.identifiers_of("A").unwrap(), set(&["g1"]));
        assert_eq!(manager.identifiers_of("C").unwrap(), set(&["g3"]));
        assert!(!manager.index().unwrap().forward().contains_key("B"));
    }

    #[test]
    fn test_asset_change_removes_stale_links() {
        let temp = TempDir::new().unwrap();
        let source = MemorySource::with(&[("A", Some("a: {guid: g1, t: 1}\nb: {guid: g2, t: 1}"))]);
        let mut manager = manager(&temp, source);
        manager.initialize().unwrap();
        assert_eq!(manager.assets_referencing("g1").unwrap(), set(&["A"]));

        manager.source.put("A", Some("b: {guid: g2, t: 1}"));
        manager.on_asset_changed("A").unwrap();

        assert!(manager.assets_referencing("g1").unwrap().is_empty());
        assert_eq!(manager.assets_referencing("g2").unwrap(), set(&["A"]));
    }

    #[test]
    fn test_asset_change_deferred_until_shutdown() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();

        manager.source.put("A", Some("guid: g2,"));
        manager.on_asset_changed("A").unwrap();
        assert!(manager.is_dirty());

        let on_disk = manager.store().load().unwrap().unwrap();
        assert_eq!(on_disk.identifiers_of("A").unwrap(), &set(&["g1"]));

        manager.on_shutdown_or_rebuild_trigger().unwrap();
        let on_disk = manager.store().load().unwrap().unwrap();
        assert_eq!(on_disk.identifiers_of("A").unwrap(), &set(&["g2"]));
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_asset_change_persists_immediately_when_configured() {
        let temp = TempDir::new().unwrap();
        let config = IndexConfig::new(temp.path()).with_persist_on_every_change(true);
        let mut manager =
            IndexManager::new(config, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();

        manager.source.put("A", Some("guid: g2,"));
        manager.on_asset_changed("A").unwrap();

        let on_disk = manager.store().load().unwrap().unwrap();
        assert_eq!(on_disk.identifiers_of("A").unwrap(), &set(&["g2"]));
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_failed_change_leaves_index_untouched() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();

        manager.source.put("A", None);
        assert!(matches!(manager.on_asset_changed("A"), Err(IndexError::Io { .. })));
        assert_eq!(manager.identifiers_of("A").unwrap(), set(&["g1"]));
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_asset_removed_drops_links() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();

        assert!(manager.on_asset_removed("A").unwrap());
        assert!(!manager.on_asset_removed("A").unwrap());
        assert!(manager.assets_referencing("g1").unwrap().is_empty());
    }

    #[test]
    fn test_force_full_rebuild_picks_up_new_assets() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();

        manager.source.put("B", Some("guid: g1,"));
        let report = manager.force_full_rebuild().unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(manager.assets_referencing("g1").unwrap(), set(&["A", "B"]));
        assert_eq!(manager.state(), ManagerState::Ready);
    }

    #[test]
    fn test_shutdown_before_initialize_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::default());

        manager.on_shutdown_or_rebuild_trigger().unwrap();
        assert!(manager.store().load().unwrap().is_none());
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp, MemorySource::with(&[("A", Some("guid: g1,"))]));
        manager.initialize().unwrap();
        manager.initialize().unwrap();

        assert_eq!(manager.identifiers_of("A").unwrap(), set(&["g1"]));
    }
}
