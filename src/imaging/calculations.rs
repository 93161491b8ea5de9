//! Pure geometry for the square crop box.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::CropRegion;

/// Share of the shorter image edge covered by the initial crop box.
pub const INITIAL_COVERAGE: f64 = 0.8;

/// Initial square crop box, centered, covering `coverage` of the shorter edge.
///
/// # Examples
/// ```
/// # use profile_photo::imaging::initial_region;
/// // 1000x500 landscape: shorter edge 500 → 400px box, centered
/// let r = initial_region((1000, 500), 0.8);
/// assert_eq!((r.x, r.y, r.width, r.height), (300, 50, 400, 400));
/// ```
pub fn initial_region(dims: (u32, u32), coverage: f64) -> CropRegion {
    let (w, h) = dims;
    let short_edge = w.min(h);
    let size = ((short_edge as f64) * coverage.clamp(0.0, 1.0)).round() as u32;
    let size = size.min(short_edge);
    CropRegion::square((w - size) / 2, (h - size) / 2, size)
}

/// Force `region` square and confine it within an image of `dims`.
///
/// The square edge is the smaller of the region's two edges, capped by the
/// image's shorter edge. The origin is then pulled back so the box fits.
pub fn clamp_region(region: CropRegion, dims: (u32, u32)) -> CropRegion {
    let (w, h) = dims;
    let size = region.width.min(region.height).min(w.min(h));
    let x = region.x.min(w - size);
    let y = region.y.min(h - size);
    CropRegion::square(x, y, size)
}

/// Move the box to a new origin, keeping its size.
pub fn move_region(region: CropRegion, x: u32, y: u32, dims: (u32, u32)) -> CropRegion {
    clamp_region(CropRegion { x, y, ..region }, dims)
}

/// Resize the box around its center to `size`, keeping it inside the image.
pub fn resize_region(region: CropRegion, size: u32, dims: (u32, u32)) -> CropRegion {
    let center_x = region.x as i64 + region.width as i64 / 2;
    let center_y = region.y as i64 + region.height as i64 / 2;
    let half = size as i64 / 2;
    let x = (center_x - half).max(0) as u32;
    let y = (center_y - half).max(0) as u32;
    clamp_region(CropRegion::square(x, y, size), dims)
}
