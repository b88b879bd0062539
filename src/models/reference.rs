use std::collections::{BTreeMap, BTreeSet};

/// Root-relative, `/`-separated path of an indexed asset
pub type AssetPath = String;

/// Opaque GUID token embedded in asset text
pub type Guid = String;

/// Asset path to the GUIDs that asset references
pub type ForwardIndex = BTreeMap<AssetPath, BTreeSet<Guid>>;

/// GUID to the assets that reference it
pub type ReverseIndex = BTreeMap<Guid, BTreeSet<AssetPath>>;
