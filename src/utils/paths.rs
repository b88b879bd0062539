use std::borrow::Cow;
use std::env;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

/// Converts a file path beneath `root` into its asset key
///
/// Keys are root-relative and always `/`-separated so the store is portable across
/// platforms. Returns `None` if `path` is not beneath `root`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use prefab_index::utils::asset_key;
///
/// let key = asset_key(Path::new("/game"), Path::new("/game/Assets/Player.prefab"));
/// assert_eq!(key.as_deref(), Some("Assets/Player.prefab"));
/// ```
pub fn asset_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<Cow<'_, str>> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

/// Validates that an asset key stays beneath the project root
///
/// # Errors
///
/// Returns an error if:
/// - The key is empty
/// - The key is absolute
/// - The key contains '..' components (path traversal)
pub fn validate_asset_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("Asset path is empty");
    }

    let path = Path::new(key);
    if path.has_root() {
        bail!("Asset path must be relative to the project root: {}", key);
    }

    for component in path.components() {
        if component == Component::ParentDir {
            bail!("Asset path contains '..' component: {}", key);
        }
    }

    Ok(())
}

/// Resolves an asset key back to a file path beneath `root`
pub fn resolve_asset(root: &Path, key: &str) -> PathBuf {
    key.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Normalises a user-supplied asset argument into an asset key
///
/// Accepts either a key (`Assets/Player.prefab`), a platform path relative to the root,
/// or an absolute path beneath the root. Empty and `.` segments are dropped so every
/// spelling of a file maps to the one key discovery produces.
pub fn normalize_asset_arg(root: &Path, arg: &str) -> Result<String> {
    let path = Path::new(arg);
    let key = if path.is_absolute() {
        match asset_key(root, path) {
            Some(key) => key,
            None => bail!("{} is not inside the project root {}", arg, root.display()),
        }
    } else {
        let slashed = arg.replace('\\', "/");
        let mut parts: Vec<Cow<'_, str>> = Vec::new();
        for component in Path::new(&slashed).components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir => bail!("Asset path contains '..' component: {}", arg),
                Component::RootDir | Component::Prefix(_) => {
                    bail!("Asset path must be relative to the project root: {}", arg)
                }
            }
        }
        parts.join("/")
    };

    validate_asset_key(&key)?;
    Ok(key)
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return Path::new("~").join(rest).to_string_lossy().into_owned();
    }

    path.to_string_lossy().into_owned()
}
