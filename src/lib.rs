//! Prefab Index - bidirectional GUID reference index for prefab assets
//!
//! Scans serialized prefab files for embedded `guid: <value>,` references and keeps two
//! maps consistent:
//!
//! - asset path -> GUIDs the asset references
//! - GUID -> asset paths referencing it
//!
//! The index is cached as JSON under `<project root>/PrefabCache/` so later sessions skip
//! the full rebuild, and is kept current one asset at a time as the host reports changes.
//!
//! # Example
//!
//! ```no_run
//! use prefab_index::{IndexConfig, IndexManager};
//!
//! let mut manager = IndexManager::open(IndexConfig::from_env("/projects/game"));
//! manager.initialize()?;
//!
//! let users = manager.assets_referencing("a1b2c3d4e5f60718293a4b5c6d7e8f90")?;
//! println!("Referenced by {} prefabs", users.len());
//!
//! manager.on_shutdown_or_rebuild_trigger()?;
//! # Ok::<(), prefab_index::IndexError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod index_storage;
pub mod indexer;
pub mod models;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use index::ReferenceIndex;
pub use index_storage::IndexStore;
pub use indexer::{AssetSource, FsAssetSource, IndexManager, ManagerState};
pub use scanner::{scan_content, scan_file};
