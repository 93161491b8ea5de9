//! Shared test utilities for the profile-photo test suite.
//!
//! Provides synthetic image fixtures (encoded in memory, no files on disk),
//! candidate builders, and visibility assertions for the field's four regions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut field = ProfilePhotoField::new(RustBackend::new(), &FieldConfig::default(), None);
//! field.handle(Gesture::FilesChosen(vec![jpeg_candidate(640, 480)]));
//!
//! assert_visible(&field.view().visibility, &["drop_zone", "modal"]);
//! ```

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

use crate::preview::Visibility;
use crate::types::ImageCandidate;

// =========================================================================
// Image fixtures
// =========================================================================

/// Encode a gradient JPEG of the given size.
pub fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Encode a half-transparent PNG of the given size.
pub fn encode_png_rgba(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([20, 120, 220, alpha])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

// =========================================================================
// Candidates
// =========================================================================

pub fn jpeg_candidate(width: u32, height: u32) -> ImageCandidate {
    ImageCandidate::new("photo.jpg", "image/jpeg", encode_test_jpeg(width, height))
}

pub fn png_candidate(width: u32, height: u32) -> ImageCandidate {
    ImageCandidate::new("photo.png", "image/png", encode_png_rgba(width, height))
}

/// A candidate with arbitrary metadata and `size` zero bytes of payload.
pub fn sized_candidate(name: &str, mime: &str, size: usize) -> ImageCandidate {
    ImageCandidate::new(name, mime, vec![0u8; size])
}

// =========================================================================
// Visibility assertions
// =========================================================================

/// Names of the visible regions, in a fixed order, for readable assertion output.
pub fn visible_regions(v: &Visibility) -> Vec<&'static str> {
    let mut out = Vec::new();
    if v.drop_zone {
        out.push("drop_zone");
    }
    if v.existing {
        out.push("existing");
    }
    if v.preview {
        out.push("preview");
    }
    if v.modal {
        out.push("modal");
    }
    out
}

/// Assert exactly `expected` regions are visible. Panics with both lists on mismatch.
pub fn assert_visible(v: &Visibility, expected: &[&str]) {
    let actual = visible_regions(v);
    assert_eq!(
        actual, expected,
        "visible regions mismatch: got {actual:?}, expected {expected:?}"
    );
}
