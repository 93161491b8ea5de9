//! Shared value types that flow between the field's components.
//!
//! None of these carry behaviour beyond small accessors; the state machine
//! lives in [`field`](crate::field), the pixel work in [`imaging`](crate::imaging).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// MIME type of every cropped payload.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// Filename given to the synthetic file written into the form.
pub const OUTPUT_FILENAME: &str = "profile.jpg";

/// Edge length of the square output raster, in pixels.
pub const OUTPUT_SIZE: u32 = 2048;

/// A file the user picked (browse, drop, or replace), before validation.
///
/// Immutable once created. The bytes are reference counted so that handing
/// the candidate to a crop session or a preview job never copies the payload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl ImageCandidate {
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type, exactly as reported by the picker.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Payloads can be megabytes; keep them out of debug output.
impl fmt::Debug for ImageCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCandidate")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Crop rectangle in source-image pixel coordinates.
///
/// The crop session keeps `width == height`; the type itself does not,
/// so that intermediate values from a drag can be represented before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn square(x: u32, y: u32, size: u32) -> Self {
        Self {
            x,
            y,
            width: size,
            height: size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Output of a confirmed crop: an encoded square raster.
#[derive(Clone, PartialEq, Eq)]
pub struct CropResult {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl fmt::Debug for CropResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropResult")
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// What the form will submit, and therefore what the field shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    /// The profile already has an image on the server and nothing changed.
    Existing,
    /// A new file is committed to the form and will be uploaded.
    Pending,
    /// The user asked for the current image to be removed.
    Deleted,
    /// No image on the server, nothing committed.
    Empty,
}

impl UploadState {
    /// Initial state for a field, depending on whether the profile has an image.
    pub fn initial(has_existing: bool) -> Self {
        if has_existing {
            Self::Existing
        } else {
            Self::Empty
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Existing => "existing",
            Self::Pending => "pending",
            Self::Deleted => "deleted",
            Self::Empty => "empty",
        };
        f.write_str(s)
    }
}
