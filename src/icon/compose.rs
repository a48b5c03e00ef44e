//! Framing a raw icon: crop to content, fit inside the frame, composite, resize

use super::IconError;
use super::geometry::{Rect, aspect_fit, centered_offset, effective_bounding_box};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, trace};

/// Filter for every resize step. Lanczos keeps small icons from aliasing.
const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Decode `path` as RGBA. A missing file is reported as such rather than
/// as a decoder error.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, IconError> {
    if !path.is_file() {
        return Err(IconError::MissingSource(path.to_path_buf()));
    }
    Ok(image::open(path)?.to_rgba8())
}

fn content_box(image: &RgbaImage, path: &Path) -> Result<Rect, IconError> {
    effective_bounding_box(image).ok_or_else(|| IconError::EmptyAsset(path.to_path_buf()))
}

/// Frame the icon at `icon_path` with the frame at `frame_path` and scale the
/// result to `icon_size` square.
pub fn compose(
    icon_path: &Path,
    frame_path: &Path,
    padding: u32,
    icon_size: u32,
) -> Result<RgbaImage, IconError> {
    let icon = load_rgba(icon_path)?;
    let frame = load_rgba(frame_path)?;
    compose_images(&icon, icon_path, &frame, frame_path, padding, icon_size)
}

/// Same as [`compose`] on already decoded images. The paths only label errors.
pub fn compose_images(
    icon: &RgbaImage,
    icon_path: &Path,
    frame: &RgbaImage,
    frame_path: &Path,
    padding: u32,
    icon_size: u32,
) -> Result<RgbaImage, IconError> {
    if icon_size == 0 {
        return Err(IconError::InvalidIconSize(icon_size));
    }

    let framed = frame_icon(icon, icon_path, frame, frame_path, padding)?;
    trace!(
        "Scaling framed icon {}x{} to {}px",
        framed.width(),
        framed.height(),
        icon_size
    );
    Ok(imageops::resize(&framed, icon_size, icon_size, RESIZE_FILTER))
}

/// The compositing pass at the frame's own resolution.
///
/// The fitted icon is laid onto a transparent canvas the size of the whole
/// frame image, then the frame is alpha-composited over it so the border art
/// stays on top.
///
/// Semi-transparent icon pixels keep their own alpha; it is not squared by
/// a self-masked paste.
pub fn frame_icon(
    icon: &RgbaImage,
    icon_path: &Path,
    frame: &RgbaImage,
    frame_path: &Path,
    padding: u32,
) -> Result<RgbaImage, IconError> {
    let icon_box = content_box(icon, icon_path)?;
    let frame_box = content_box(frame, frame_path)?;

    let interior = (
        frame_box.width.saturating_sub(padding.saturating_mul(2)),
        frame_box.height.saturating_sub(padding.saturating_mul(2)),
    );
    if interior.0 == 0 || interior.1 == 0 {
        return Err(IconError::FrameTooSmall {
            path: frame_path.to_path_buf(),
            width: frame_box.width,
            height: frame_box.height,
            padding,
        });
    }

    let cropped = imageops::crop_imm(icon, icon_box.x, icon_box.y, icon_box.width, icon_box.height)
        .to_image();
    let (fit_w, fit_h) = aspect_fit(icon_box.size(), interior);
    debug!(
        "Fitting {}x{} icon into {}x{} interior as {}x{}",
        icon_box.width, icon_box.height, interior.0, interior.1, fit_w, fit_h
    );
    let resized = imageops::resize(&cropped, fit_w, fit_h, RESIZE_FILTER);

    let mut canvas = RgbaImage::new(frame.width(), frame.height());
    let (x, y) = centered_offset(frame.dimensions(), resized.dimensions());
    imageops::overlay(&mut canvas, &resized, x, y);
    imageops::overlay(&mut canvas, frame, 0, 0);
    Ok(canvas)
}
