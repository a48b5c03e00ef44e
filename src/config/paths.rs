//! Where the settings live on disk

use super::ConfigError;
use crate::constant::{APP_NAME, DEFAULT_SETTINGS_FILE, SETTINGS_NAME};
use std::path::{Path, PathBuf};

/// The two files the store reads from: the per-user settings file (read and
/// written) and the bundled defaults (read-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub user_file: PathBuf,
    pub bundled_defaults: PathBuf,
}

impl ConfigPaths {
    pub fn new(user_file: impl Into<PathBuf>, bundled_defaults: impl Into<PathBuf>) -> Self {
        Self {
            user_file: user_file.into(),
            bundled_defaults: bundled_defaults.into(),
        }
    }

    /// Platform config directory for the user file, bundled defaults
    /// relative to the working directory.
    pub fn platform() -> Result<Self, ConfigError> {
        let user_file = confy::get_configuration_file_path(APP_NAME, SETTINGS_NAME)?;
        Ok(Self::new(user_file, DEFAULT_SETTINGS_FILE))
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.user_file.parent()
    }
}
