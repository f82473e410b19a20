//! Error types for settings operations.

use std::fmt;
use std::path::PathBuf;

use squash_core::display::ParseColorError;
use thiserror::Error;

/// Filesystem step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    /// Reading the settings file.
    Read,
    /// Writing the settings file.
    Write,
    /// Creating the settings directory.
    CreateDir,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::CreateDir => "create directory",
        })
    }
}

/// Errors from loading, validating or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A filesystem call failed.
    #[error("cannot {action} '{path}': {source}")]
    Io {
        /// What was being attempted.
        action: IoAction,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid settings TOML.
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be written as TOML.
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A color string is not `#rrggbb` or `#rrggbbaa`.
    #[error("invalid color for '{key}': {source}")]
    InvalidColor {
        /// Settings key holding the color.
        key: &'static str,
        /// Parse failure.
        #[source]
        source: ParseColorError,
    },

    /// A numeric setting is out of range.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Settings key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    fn io(action: IoAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Reading `path` failed.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Read, path, source)
    }

    /// Writing `path` failed.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Write, path, source)
    }

    /// Creating directory `path` failed.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::CreateDir, path, source)
    }

    /// True when a read failed because the file does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            Self::Io { action: IoAction::Read, source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
