use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable naming the project root
pub const ROOT_ENV: &str = "PREFAB_INDEX_ROOT";

/// Environment variable for the "save cache on prefab change" preference
pub const SAVE_ON_CHANGE_ENV: &str = "PREFAB_INDEX_SAVE_ON_CHANGE";

/// Get the project root: `$PREFAB_INDEX_ROOT` if set, otherwise the current directory
pub fn get_project_root() -> Result<PathBuf> {
    match env::var_os(ROOT_ENV) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => env::current_dir().context("Failed to determine current directory"),
    }
}

/// Parse a boolean preference value; unset or unrecognised values are false
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Read a boolean preference from the environment
pub fn env_flag(name: &str) -> bool {
    parse_flag(env::var(name).ok().as_deref())
}
