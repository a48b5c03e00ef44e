/// Application name and metadata constants
pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "ParticlePlayground";
pub const APP_NAME: &str = "ParticlePlayground";

/// Settings file stem inside the per-user config directory (`settings.toml`)
pub const SETTINGS_NAME: &str = "settings";
/// Bundled defaults, shipped next to the assets and resolved from the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "default_settings.toml";

// Hardcoded last-resort settings
pub const DEFAULT_CURSOR_SIZE: i64 = 5;
pub const DEFAULT_CURSOR_MAX_SIZE: i64 = 50;
pub const DEFAULT_WINDOW_WIDTH: i64 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i64 = 600;

/// Icon cache layout and sizing
pub const ICON_CACHE_DIR: &str = "icons";
pub const ICON_CACHE_EXT: &str = "png";
pub const DEFAULT_ICON_SIZE: u32 = 64;
pub const DEFAULT_ICON_PADDING: u32 = 10;

/// Palette setting paths
pub const ICON_SIZE_PATH: [&str; 3] = ["graphics", "palette", "icon_size"];
pub const SELECTED_GROUP_PATH: [&str; 3] = ["graphics", "palette", "palette_group_selected"];
pub const DEFAULT_SELECTED_GROUP: &str = "powders";

/// Environment variable consulted for the log filter
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
