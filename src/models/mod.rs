//! Data models for the prefab reference index.
//!
//! - [`ForwardIndex`] / [`ReverseIndex`] - the two halves of the index
//! - [`RebuildReport`] - scanned and skipped assets of a full rebuild
//! - [`IndexStats`] - counts reported by the `stats` command

pub mod reference;
pub mod report;

pub use reference::{AssetPath, ForwardIndex, Guid, ReverseIndex};
pub use report::{IndexStats, RebuildReport, SkippedAsset};
