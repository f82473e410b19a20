//! Where the settings file lives.
//!
//! - Linux: `~/.config/squash/settings.toml`
//! - macOS: `~/Library/Application Support/squash/settings.toml`
//! - Windows: `%APPDATA%\squash\settings.toml`
//!
//! The `SQUASH_CONFIG` environment variable overrides the file path.

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "squash";

/// Settings file name inside the config directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Environment variable that points at an alternative settings file.
pub const CONFIG_ENV: &str = "SQUASH_CONFIG";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the settings file, honouring [`CONFIG_ENV`].
pub fn settings_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => user_config_dir().join(SETTINGS_FILE),
    }
}
