//! Persistent index storage
//!
//! Caches the reference index to disk so a session can skip the full rebuild. Uses a
//! two-file approach beneath `<project root>/PrefabCache/`:
//! - `PrefabToGUID.json`: asset path -> GUIDs it references
//! - `GUIDToPrefab.json`: GUID -> asset paths referencing it
//!
//! Both are plain JSON objects of `string -> [string]`.

pub mod persistence;

pub use persistence::IndexStore;
