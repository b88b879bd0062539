//! Error types for the prefab reference index.

use std::path::PathBuf;

use thiserror::Error;

/// All errors the index, its store and its manager can produce.
#[derive(Error, Debug)]
pub enum IndexError {
    /// An asset or a store file could not be read or written.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted store exists but does not describe a valid index.
    #[error("Malformed index store {}: {reason}", .path.display())]
    MalformedStore { path: PathBuf, reason: String },

    /// The asset has never been scanned.
    #[error("Asset not indexed: {0}")]
    AssetNotFound(String),

    /// No indexed asset references the GUID.
    #[error("No asset references GUID: {0}")]
    GuidNotFound(String),

    /// A query was issued before the manager finished initializing.
    #[error("Index is not ready; call initialize() first")]
    NotReady,
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedStore { path: path.into(), reason: reason.into() }
    }

    /// True for the recoverable "no recorded entry" query failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AssetNotFound(_) | Self::GuidNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
