use std::env;
use std::path::PathBuf;

use crate::catalog::CatalogConfig;

use super::error::{CoreError, CoreErrorCode};

pub const SAVE_DIR_ENV: &str = "SIGNUS_SAVE_DIR";
const SAVE_SUBDIR: &str = "saved_games";

/// Per-user save directory: `$SIGNUS_SAVE_DIR`, else
/// `$XDG_CONFIG_HOME/signus/saved_games`, else `$HOME/.signus/saved_games`.
pub fn default_save_dir() -> Option<PathBuf> {
    resolve_save_dir(|key| env::var_os(key).map(PathBuf::from))
}

fn resolve_save_dir(var: impl Fn(&str) -> Option<PathBuf>) -> Option<PathBuf> {
    let non_empty = |key: &str| var(key).filter(|p| !p.as_os_str().is_empty());

    if let Some(dir) = non_empty(SAVE_DIR_ENV) {
        return Some(dir);
    }
    if let Some(config) = non_empty("XDG_CONFIG_HOME") {
        return Some(config.join("signus").join(SAVE_SUBDIR));
    }
    non_empty("HOME").map(|home| home.join(".signus").join(SAVE_SUBDIR))
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        default_save_dir().map(Self::new).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("cannot locate the save directory; set {SAVE_DIR_ENV}"),
            )
        })
    }
}
