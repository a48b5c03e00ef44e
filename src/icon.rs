//! Framed palette icons
//!
//! A palette icon is a raw asset image centered inside a decorative frame,
//! scaled to the configured icon size. Composing is comparatively slow, so
//! every result is written under the platform cache directory and reused
//! for as long as the file exists.

mod cache;
mod compose;
pub mod geometry;

pub use cache::CacheKey;
pub use compose::{compose, compose_images, frame_icon};

use crate::config::ConfigStore;
use crate::constant::{
    APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, DEFAULT_ICON_PADDING, DEFAULT_ICON_SIZE,
    ICON_CACHE_DIR, ICON_SIZE_PATH,
};
use directories::ProjectDirs;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("Icon source not found: {0}")]
    MissingSource(PathBuf),

    #[error("Image has no visible pixels: {0}")]
    EmptyAsset(PathBuf),

    #[error("Frame {path:?} ({width}x{height}) leaves no room inside {padding}px padding")]
    FrameTooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
        padding: u32,
    },

    #[error("Invalid icon size: {0}")]
    InvalidIconSize(u32),

    #[error("Could not determine the cache directory")]
    NoCacheDir,

    #[error("Cannot create cache directory {path:?}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Produces framed icons and memoizes them on disk
#[derive(Debug)]
pub struct IconPipeline {
    cache_root: PathBuf,
    icon_size: u32,
    padding: u32,
    compositions: AtomicUsize,
}

impl IconPipeline {
    pub fn new(cache_root: impl Into<PathBuf>, icon_size: u32) -> Self {
        Self {
            cache_root: cache_root.into(),
            icon_size,
            padding: DEFAULT_ICON_PADDING,
            compositions: AtomicUsize::new(0),
        }
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Pipeline whose icon size comes from `graphics.palette.icon_size`.
    ///
    /// The size is read once; later changes to the setting need a new pipeline.
    pub fn from_config(config: &ConfigStore, cache_root: impl Into<PathBuf>) -> Self {
        let configured = config.get_int(&ICON_SIZE_PATH, i64::from(DEFAULT_ICON_SIZE));
        let icon_size = match u32::try_from(configured) {
            Ok(size) if size > 0 => size,
            _ => {
                warn!(
                    "Icon size {} is out of range. Using {}",
                    configured, DEFAULT_ICON_SIZE
                );
                DEFAULT_ICON_SIZE
            }
        };
        Self::new(cache_root, icon_size)
    }

    /// The platform cache directory for the application
    pub fn platform_cache_root() -> Result<PathBuf, IconError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or(IconError::NoCacheDir)
    }

    /// Cache key for an asset under this pipeline's size and padding
    pub fn cache_key_for(&self, id: &str, icon_path: &Path, frame_path: &Path) -> CacheKey {
        CacheKey::for_asset(id, icon_path, frame_path, self.icon_size, self.padding)
    }

    /// Return the framed icon for `key`, composing and caching it on a miss.
    ///
    /// Nothing is written when composing fails.
    pub fn resolve(
        &self,
        icon_path: &Path,
        frame_path: &Path,
        key: &CacheKey,
    ) -> Result<RgbaImage, IconError> {
        let cache_path = key.resolve_in(&self.cache_root);
        if cache_path.is_file() {
            debug!("Icon cache hit: {}", key);
            return Ok(image::open(&cache_path)?.to_rgba8());
        }

        info!(
            "Icon cache miss: {}, composing {:?} in {:?}",
            key, icon_path, frame_path
        );
        let framed = self.compose(icon_path, frame_path)?;
        self.store(&cache_path, &framed)?;
        Ok(framed)
    }

    /// Like [`IconPipeline::resolve`] but hands back the cache file location
    pub fn resolve_path(
        &self,
        icon_path: &Path,
        frame_path: &Path,
        key: &CacheKey,
    ) -> Result<PathBuf, IconError> {
        let cache_path = key.resolve_in(&self.cache_root);
        if !cache_path.is_file() {
            self.resolve(icon_path, frame_path, key)?;
        }
        Ok(cache_path)
    }

    /// Compose without touching the cache
    pub fn compose(&self, icon_path: &Path, frame_path: &Path) -> Result<RgbaImage, IconError> {
        self.compositions.fetch_add(1, Ordering::Relaxed);
        compose(icon_path, frame_path, self.padding, self.icon_size)
    }

    pub fn is_cached(&self, key: &CacheKey) -> bool {
        key.resolve_in(&self.cache_root).is_file()
    }

    /// Remove every cached icon
    pub fn clear_cache(&self) -> Result<(), IconError> {
        let dir = self.cache_root.join(ICON_CACHE_DIR);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!("Cleared icon cache {:?}", dir);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of compose runs so far
    pub fn compositions(&self) -> usize {
        self.compositions.load(Ordering::Relaxed)
    }

    pub fn icon_size(&self) -> u32 {
        self.icon_size
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Write to a uniquely named sibling and rename into place so a reader
    /// never sees a half-written entry. The sibling is removed on failure.
    fn store(&self, cache_path: &Path, image: &RgbaImage) -> Result<(), IconError> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).map_err(|source| IconError::CacheDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let partial = partial_path(cache_path);
        let written = image
            .save_with_format(&partial, ImageFormat::Png)
            .map_err(IconError::from)
            .and_then(|()| fs::rename(&partial, cache_path).map_err(IconError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        info!("Saved icon to {:?}", cache_path);
        Ok(())
    }
}

fn partial_path(cache_path: &Path) -> PathBuf {
    let name = cache_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    cache_path.with_file_name(format!(".{}.{}.partial", name, Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPaths;
    use image::Rgba;

    struct Fixture {
        dir: PathBuf,
        icon: PathBuf,
        frame: PathBuf,
        cache_root: PathBuf,
    }

    fn setup_fixture() -> Fixture {
        let dir = std::env::temp_dir().join(format!("test_icon_{}", Uuid::new_v4()));
        let assets = dir.join("assets");
        fs::create_dir_all(&assets).unwrap();

        let icon = assets.join("dust.png");
        RgbaImage::from_fn(60, 40, |x, y| {
            if (5..55).contains(&x) && (5..35).contains(&y) {
                Rgba([200, 180, 40, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save(&icon)
        .unwrap();

        let frame = assets.join("frame.png");
        RgbaImage::from_fn(48, 48, |x, y| {
            if x < 2 || y < 2 || x > 45 || y > 45 {
                Rgba([90, 90, 90, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save(&frame)
        .unwrap();

        Fixture {
            cache_root: dir.join("cache"),
            dir,
            icon,
            frame,
        }
    }

    fn cleanup_test_dir(test_dir: &Path) {
        let _ = fs::remove_dir_all(test_dir);
    }

    #[test]
    fn test_resolve_twice_composes_once() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 32).with_padding(4);
        let key = CacheKey::from_id("dust");

        let first = pipeline.resolve(&fx.icon, &fx.frame, &key).unwrap();
        let cache_file = key.resolve_in(&fx.cache_root);
        assert!(cache_file.is_file());
        let bytes_after_first = fs::read(&cache_file).unwrap();

        let second = pipeline.resolve(&fx.icon, &fx.frame, &key).unwrap();
        assert_eq!(pipeline.compositions(), 1);
        assert_eq!(first, second);
        assert_eq!(second.dimensions(), (32, 32));
        assert_eq!(fs::read(&cache_file).unwrap(), bytes_after_first);

        cleanup_test_dir(&fx.dir);
    }

    fn cache_dir_entries(cache_root: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(cache_root.join(ICON_CACHE_DIR))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_store_leaves_only_the_final_file() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 16);
        pipeline
            .resolve(&fx.icon, &fx.frame, &CacheKey::from_id("dust"))
            .unwrap();
        assert_eq!(cache_dir_entries(&fx.cache_root), vec!["dust.png".to_string()]);

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_failed_rename_removes_partial_file() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 16);
        let key = CacheKey::from_id("blocked");
        // A non-empty directory where the entry should go makes the rename fail
        let target = key.resolve_in(&fx.cache_root);
        fs::create_dir_all(target.join("inner")).unwrap();

        let err = pipeline.resolve(&fx.icon, &fx.frame, &key).unwrap_err();
        assert!(matches!(err, IconError::Io(_)));
        assert_eq!(cache_dir_entries(&fx.cache_root), vec!["blocked.png".to_string()]);

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_existing_file_is_trusted() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 32);
        let key = CacheKey::from_id("stale");

        let marker = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        let path = key.resolve_in(&fx.cache_root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        marker.save(&path).unwrap();

        let resolved = pipeline.resolve(&fx.icon, &fx.frame, &key).unwrap();
        assert_eq!(resolved, marker);
        assert_eq!(pipeline.compositions(), 0);

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_transparent_icon_writes_nothing() {
        let fx = setup_fixture();
        let blank = fx.dir.join("assets").join("blank.png");
        RgbaImage::new(16, 16).save(&blank).unwrap();

        let pipeline = IconPipeline::new(&fx.cache_root, 32);
        let key = CacheKey::from_id("blank");

        let err = pipeline.resolve(&blank, &fx.frame, &key).unwrap_err();
        assert!(matches!(err, IconError::EmptyAsset(_)));
        assert!(!pipeline.is_cached(&key));
        assert!(!fx.cache_root.join(ICON_CACHE_DIR).exists());

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_missing_source_writes_nothing() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 32);
        let key = CacheKey::from_id("ghost");
        let missing = fx.dir.join("assets").join("ghost.png");

        let err = pipeline.resolve(&missing, &fx.frame, &key).unwrap_err();
        assert!(matches!(err, IconError::MissingSource(p) if p == missing));
        assert!(!pipeline.is_cached(&key));

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_unwritable_cache_root_is_reported() {
        let fx = setup_fixture();
        let blocker = fx.dir.join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let pipeline = IconPipeline::new(&blocker, 32);
        let err = pipeline
            .resolve(&fx.icon, &fx.frame, &CacheKey::from_id("dust"))
            .unwrap_err();
        assert!(matches!(err, IconError::CacheDir { .. }));

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_resolve_path_and_clear_cache() {
        let fx = setup_fixture();
        let pipeline = IconPipeline::new(&fx.cache_root, 16);
        let key = pipeline.cache_key_for("dust", &fx.icon, &fx.frame);

        let path = pipeline.resolve_path(&fx.icon, &fx.frame, &key).unwrap();
        assert_eq!(path, key.resolve_in(&fx.cache_root));
        assert!(path.is_file());
        assert_eq!(image::open(&path).unwrap().to_rgba8().dimensions(), (16, 16));

        pipeline.resolve_path(&fx.icon, &fx.frame, &key).unwrap();
        assert_eq!(pipeline.compositions(), 1);

        pipeline.clear_cache().unwrap();
        assert!(!pipeline.is_cached(&key));
        // Clearing an absent cache is fine
        pipeline.clear_cache().unwrap();

        cleanup_test_dir(&fx.dir);
    }

    #[test]
    fn test_from_config_reads_icon_size() {
        let fx = setup_fixture();
        let paths = ConfigPaths::new(
            fx.dir.join("config").join("settings.toml"),
            fx.dir.join("missing_defaults.toml"),
        );
        let mut config = ConfigStore::open(paths).unwrap();

        let pipeline = IconPipeline::from_config(&config, &fx.cache_root);
        assert_eq!(pipeline.icon_size(), DEFAULT_ICON_SIZE);
        assert_eq!(pipeline.padding(), DEFAULT_ICON_PADDING);

        config.set(24, &ICON_SIZE_PATH).unwrap();
        assert_eq!(IconPipeline::from_config(&config, &fx.cache_root).icon_size(), 24);

        config.set(-3, &ICON_SIZE_PATH).unwrap();
        assert_eq!(
            IconPipeline::from_config(&config, &fx.cache_root).icon_size(),
            DEFAULT_ICON_SIZE
        );

        cleanup_test_dir(&fx.dir);
    }
}
