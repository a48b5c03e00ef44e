//! Bounding boxes, aspect fitting and centering for icon compositing

use image::RgbaImage;

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Smallest rectangle enclosing every pixel whose alpha is non-zero.
///
/// `None` for a fully transparent (or zero-sized) image.
pub fn effective_bounding_box(image: &RgbaImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Largest size with the aspect ratio of `source` that fits in `available`.
///
/// The result touches at least one edge of `available` and never exceeds
/// either dimension. Fractional sizes are truncated, and each side is at
/// least one pixel.
pub fn aspect_fit(source: (u32, u32), available: (u32, u32)) -> (u32, u32) {
    let (width, height) = source;
    let (avail_w, avail_h) = available;
    let ratio = f64::from(width) / f64::from(height);

    let (new_w, new_h) = if f64::from(avail_w) / ratio <= f64::from(avail_h) {
        (f64::from(avail_w), f64::from(avail_w) / ratio)
    } else {
        (f64::from(avail_h) * ratio, f64::from(avail_h))
    };

    (
        (new_w as u32).clamp(1, avail_w.max(1)),
        (new_h as u32).clamp(1, avail_h.max(1)),
    )
}

/// Top-left offset that centers `inner` in `outer`. Signed because an
/// inner image larger than the canvas overhangs it.
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (i64::from(outer.0) - i64::from(inner.0)).div_euclid(2),
        (i64::from(outer.1) - i64::from(inner.1)).div_euclid(2),
    )
}
