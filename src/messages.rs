use crate::icon::{CacheKey, IconError};
use image::RgbaImage;
use std::path::PathBuf;

/// One icon to frame and cache
#[derive(Debug, Clone)]
pub struct IconRequest {
    pub id: String,
    pub icon_path: PathBuf,
    pub frame_path: PathBuf,
    pub key: CacheKey,
}

/// Messages sent to the prefetch thread
pub enum PrefetchMessage {
    Resolve(IconRequest),
    /// Stop the prefetch thread
    Stop,
}

/// Response messages from the prefetch thread
pub enum ResponseMessage {
    IconResolved {
        id: String,
        key: CacheKey,
        result: Result<RgbaImage, IconError>,
    },
}
