//! Parameter types for image operations.
//!
//! These describe *what* the backend should produce, not how. The crop
//! session builds them; the [`backend`](super::backend) executes them.

use crate::types::{CropRegion, OUTPUT_SIZE};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Convert a `0.0..=1.0` encoder factor (as canvas APIs take it).
    pub fn from_factor(factor: f32) -> Self {
        Self::new((factor * 100.0).round() as u32)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Fixed output quality: a 0.95 encoder factor.
impl Default for Quality {
    fn default() -> Self {
        Self::from_factor(0.95)
    }
}

/// Render a source region onto a square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub region: CropRegion,
    /// Edge of the square output canvas.
    pub output_size: u32,
}

impl RenderParams {
    /// Render `region` at the normalized output size.
    pub fn normalized(region: CropRegion) -> Self {
        Self {
            region,
            output_size: OUTPUT_SIZE,
        }
    }
}
