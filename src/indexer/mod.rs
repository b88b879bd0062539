//! Index building and lifecycle management
//!
//! # Error Handling Strategy
//!
//! The indexer combines graceful degradation with explicit failure reporting:
//!
//! - **Asset-level failures**: An asset that cannot be read during a full rebuild is logged,
//!   left out of the index and recorded in the [`RebuildReport`](crate::models::RebuildReport).
//!   One unreadable asset never aborts the rebuild of the rest.
//!
//! - **Incremental updates**: A failed read in [`IndexManager::on_asset_changed`] propagates
//!   and leaves the index as it was.
//!
//! - **Store failures**: A corrupt or mismatched store is surfaced from
//!   [`IndexManager::initialize`] instead of being silently rebuilt over.

pub mod discovery;
pub mod manager;

pub use discovery::{AssetSource, FsAssetSource};
pub use manager::{IndexManager, ManagerState};
