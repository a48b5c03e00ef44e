//! On-disk cache layout for framed icons

use crate::constant::{ICON_CACHE_DIR, ICON_CACHE_EXT};
use std::fmt;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::xxh64;

/// Relative path of a cached icon under the cache root.
///
/// The file existing is all it takes for the entry to count as valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(PathBuf);

impl CacheKey {
    /// `icons/<id>.png`
    pub fn from_id(id: &str) -> Self {
        Self(Path::new(ICON_CACHE_DIR).join(format!("{}.{}", file_stem(id), ICON_CACHE_EXT)))
    }

    /// `icons/<id>-<hash>.png`, where the hash covers everything that shapes
    /// the output. Changing an asset path, the icon size or the padding
    /// lands on a fresh entry instead of reusing a stale one.
    pub fn for_asset(
        id: &str,
        icon_path: &Path,
        frame_path: &Path,
        icon_size: u32,
        padding: u32,
    ) -> Self {
        let hash = Self::calculate_hash(icon_path, frame_path, icon_size, padding);
        Self(Path::new(ICON_CACHE_DIR).join(format!(
            "{}-{}.{}",
            file_stem(id),
            hash,
            ICON_CACHE_EXT
        )))
    }

    /// An arbitrary relative path chosen by the caller
    pub fn from_relative(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// XXHash64 of the inputs as a hex string
    fn calculate_hash(icon_path: &Path, frame_path: &Path, icon_size: u32, padding: u32) -> String {
        let mut material = Vec::new();
        material.extend_from_slice(icon_path.to_string_lossy().as_bytes());
        material.push(0);
        material.extend_from_slice(frame_path.to_string_lossy().as_bytes());
        material.push(0);
        material.extend_from_slice(&icon_size.to_le_bytes());
        material.extend_from_slice(&padding.to_le_bytes());
        format!("{:016x}", xxh64(&material, 0))
    }

    pub fn relative_path(&self) -> &Path {
        &self.0
    }

    /// Absolute location of this entry under `cache_root`
    pub fn resolve_in(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(&self.0)
    }
}

/// `id` as a single file name component: anything outside `[A-Za-z0-9_-]`
/// becomes `_`, so separators and `..` cannot leave the cache directory.
fn file_stem(id: &str) -> String {
    if id.is_empty() {
        return "_".to_string();
    }
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
