pub mod environment;
pub mod paths;

pub use environment::{env_flag, get_project_root};
pub use paths::{
    asset_key, format_path_with_tilde, normalize_asset_arg, resolve_asset, validate_asset_key,
};
