//! Application settings store
//!
//! Settings are an open nested table persisted as TOML in the platform config
//! directory. Loading walks a fallback chain (user file, bundled defaults,
//! hardcoded defaults) and every write is persisted immediately through
//! `confy`, which creates the config directory on demand.

mod paths;
mod value;

pub use paths::ConfigPaths;
pub use value::{Table, Value};

use crate::constant::{
    DEFAULT_CURSOR_MAX_SIZE, DEFAULT_CURSOR_SIZE, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH,
};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Confy(#[from] confy::ConfyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Setting path must have at least one key")]
    EmptyPath,
}

/// Which link of the fallback chain produced the loaded tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    User,
    Bundled,
    Builtin,
}

/// The single source of truth for user-tunable settings.
///
/// Constructed once at startup and handed to every consumer by reference.
#[derive(Debug)]
pub struct ConfigStore {
    paths: ConfigPaths,
    tree: Table,
    source: LoadSource,
}

impl ConfigStore {
    /// Load settings from the platform locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::open(ConfigPaths::platform()?)
    }

    /// Load settings through the fallback chain.
    ///
    /// Missing, empty or corrupt files are logged and skipped. When a fallback
    /// tier is used its tree is written to the user file straight away, so the
    /// only errors returned here are persistence failures.
    pub fn open(paths: ConfigPaths) -> Result<Self, ConfigError> {
        info!("Config file: {:?}", paths.user_file);
        info!("Default settings file: {:?}", paths.bundled_defaults);

        if let Some(tree) = read_user_file(&paths.user_file) {
            return Ok(Self {
                paths,
                tree,
                source: LoadSource::User,
            });
        }

        let (tree, source) = match read_bundled_file(&paths.bundled_defaults) {
            Some(tree) => (tree, LoadSource::Bundled),
            None => {
                error!(
                    "Error reading {:?}. Using hardcoded default settings.",
                    paths.bundled_defaults
                );
                (builtin_defaults(), LoadSource::Builtin)
            }
        };

        let store = Self {
            paths,
            tree,
            source,
        };
        store.save()?;
        Ok(store)
    }

    /// Persist the whole tree to the user file, replacing its contents
    pub fn save(&self) -> Result<(), ConfigError> {
        info!("Saving settings to {:?}", self.paths.user_file);
        confy::store_path(&self.paths.user_file, &self.tree)?;
        Ok(())
    }

    /// Value at `path`, or `None` if any segment is missing or crosses a non-table
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        value::lookup(&self.tree, path)
    }

    /// Value at `path`, or `default` when it cannot be reached.
    ///
    /// No type coercion happens here; see [`ConfigStore::get_int`] for that.
    pub fn get(&self, path: &[&str], default: impl Into<Value>) -> Value {
        match self.lookup(path) {
            Some(value) => {
                debug!("Retrieved setting: {:?} = {}", path, value);
                value.clone()
            }
            None => {
                let default = default.into();
                warn!("Setting not found: {:?}. Using default: {}", path, default);
                default
            }
        }
    }

    /// Integer at `path`. Integer-looking strings are converted; anything
    /// else is logged and replaced by `default`.
    pub fn get_int(&self, path: &[&str], default: i64) -> i64 {
        match self.get(path, default) {
            Value::Int(i) => i,
            Value::Str(s) => s.trim().parse().unwrap_or_else(|e| {
                warn!(
                    "Setting {:?} = {:?} is not an integer ({}). Using {}",
                    path, s, e, default
                );
                default
            }),
            other => {
                warn!(
                    "Setting {:?} is a {}, expected integer. Using {}",
                    path,
                    other.type_name(),
                    default
                );
                default
            }
        }
    }

    /// String at `path`; integers are rendered, other kinds fall back to `default`
    pub fn get_str(&self, path: &[&str], default: &str) -> String {
        match self.get(path, default) {
            Value::Str(s) => s,
            Value::Int(i) => i.to_string(),
            other => {
                warn!(
                    "Setting {:?} is a {}, expected string. Using {:?}",
                    path,
                    other.type_name(),
                    default
                );
                default.to_string()
            }
        }
    }

    /// Assign `value` at `path`, creating intermediate tables, then persist.
    ///
    /// Whatever was at `path` is overwritten regardless of its kind. If the
    /// write fails the in-memory tree is rolled back, so memory and disk agree.
    pub fn set(&mut self, value: impl Into<Value>, path: &[&str]) -> Result<(), ConfigError> {
        if path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        let value = value.into();
        let shown = value.to_string();
        let previous = self.tree.clone();
        value::assign(&mut self.tree, path, value);
        if let Err(e) = self.save() {
            error!("Failed to persist {:?}, keeping previous settings: {}", path, e);
            self.tree = previous;
            return Err(e);
        }
        debug!("Setting updated: {:?} = {}", path, shown);
        Ok(())
    }

    pub fn tree(&self) -> &Table {
        &self.tree
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }
}

/// The last-resort tree used when neither file is usable
pub fn builtin_defaults() -> Table {
    let mut tree = Table::new();
    value::assign(&mut tree, &["cursor", "size"], DEFAULT_CURSOR_SIZE.into());
    value::assign(
        &mut tree,
        &["cursor", "max_size"],
        DEFAULT_CURSOR_MAX_SIZE.into(),
    );
    value::assign(&mut tree, &["window", "width"], DEFAULT_WINDOW_WIDTH.into());
    value::assign(&mut tree, &["window", "height"], DEFAULT_WINDOW_HEIGHT.into());
    tree
}

fn read_user_file(path: &Path) -> Option<Table> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            info!("No usable settings at {:?}: {}", path, e);
            return None;
        }
    };
    if contents.trim().is_empty() {
        warn!("Settings file {:?} is empty", path);
        return None;
    }
    match parse_table(&contents) {
        Ok(tree) => {
            info!("Loading settings from {:?}", path);
            Some(tree)
        }
        Err(e) => {
            error!("Error reading {:?}: {}. Using default settings.", path, e);
            None
        }
    }
}

fn read_bundled_file(path: &Path) -> Option<Table> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("Cannot read default settings {:?}: {}", path, e);
            return None;
        }
    };
    match parse_table(&contents) {
        Ok(tree) => {
            info!("Loading default settings from {:?}", path);
            Some(tree)
        }
        Err(e) => {
            error!("Error parsing default settings {:?}: {}", path, e);
            None
        }
    }
}

fn parse_table(contents: &str) -> Result<Table, toml::de::Error> {
    let parsed: toml::Table = contents.parse()?;
    Ok(value::table_from_toml(parsed))
}
