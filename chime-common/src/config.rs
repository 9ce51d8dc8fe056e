//! Configuration file and sound root resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name used under platform config/data dirs
pub const APP_DIR_NAME: &str = "chimeboard";

/// Configuration file name looked up in the platform config dirs
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config file, if one exists
///
/// Returns `None` when nothing is configured; callers fall back to
/// built-in defaults. An explicitly requested path is returned even if it
/// does not exist so that loading reports the missing file.
pub fn resolve_config_file(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    let found = platform_config_file();
    if found.is_none() {
        debug!("No configuration file found, using built-in defaults");
    }
    found
}

/// Sound root resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Value from the TOML config file
/// 4. OS-dependent default (fallback)
pub fn resolve_sound_root(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config_value: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    default_sound_root()
}

/// Read a configuration file into a string
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })
}

/// Find an existing config file for the platform
fn platform_config_file() -> Option<PathBuf> {
    // ~/.config/chimeboard/config.toml (or the platform equivalent)
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default sound root
fn default_sound_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        // ~/Library/Application Support/chimeboard/sounds
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join("sounds"))
            .unwrap_or_else(|| PathBuf::from("./sounds"))
    } else {
        // ~/.local/share/chimeboard/sounds, %LOCALAPPDATA%\chimeboard\sounds
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME).join("sounds"))
            .unwrap_or_else(|| PathBuf::from("./sounds"))
    }
}
