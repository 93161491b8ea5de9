//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations a crop session
//! needs: decode the picked file, render the crop onto the square canvas,
//! and encode the canvas into the normalized payload.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked. Tests use the recording `MockBackend` below.

use super::params::{Quality, RenderParams};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A decoded source image, shared between a crop session and its retries.
#[derive(Clone)]
pub struct SourceImage(Arc<DynamicImage>);

impl SourceImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self(Arc::new(pixels))
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.0
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.0.width(),
            height: self.0.height(),
        }
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = self.dimensions();
        write!(f, "SourceImage({}x{})", d.width, d.height)
    }
}

/// Trait for image processing backends.
///
/// `Sync` so that independent fields can share one backend across rayon
/// workers (the CLI's batch mode does this).
pub trait ImageBackend: Sync {
    /// Decode an accepted candidate's bytes.
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, BackendError>;

    /// Render a region of `source` onto a square RGB canvas.
    fn render(&self, source: &SourceImage, params: &RenderParams)
    -> Result<RgbImage, BackendError>;

    /// Encode a rendered canvas into the normalized lossy format.
    fn encode(&self, canvas: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}

/// Lets many fields borrow one backend.
impl<T: ImageBackend + ?Sized> ImageBackend for &T {
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, BackendError> {
        (**self).decode(bytes, mime)
    }

    fn render(&self, source: &SourceImage, params: &RenderParams)
    -> Result<RgbImage, BackendError> {
        (**self).render(source, params)
    }

    fn encode(&self, canvas: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        (**self).encode(canvas, quality)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::types::CropRegion;
    use std::sync::Mutex;

    /// Mock backend that records operations without doing pixel work.
    /// Uses Mutex (not RefCell) so it is Sync like the real backend.
    pub struct MockBackend {
        pub source_dims: Dimensions,
        pub fail_decode: bool,
        pub fail_encode: bool,
        /// Encode "succeeds" but produces no bytes.
        pub empty_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode {
            mime: String,
            len: usize,
        },
        Render {
            region: CropRegion,
            output_size: u32,
        },
        Encode {
            width: u32,
            height: u32,
            quality: u8,
        },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self::with_dimensions(800, 600)
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                source_dims: Dimensions { width, height },
                fail_decode: false,
                fail_encode: false,
                empty_encode: false,
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_encode() -> Self {
            Self {
                fail_encode: true,
                ..Self::default()
            }
        }

        pub fn failing_decode() -> Self {
            Self {
                fail_decode: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Decode {
                mime: mime.to_string(),
                len: bytes.len(),
            });
            if self.fail_decode {
                return Err(BackendError::ProcessingFailed("mock decode failure".into()));
            }
            Ok(SourceImage::new(DynamicImage::new_rgb8(
                self.source_dims.width,
                self.source_dims.height,
            )))
        }

        fn render(
            &self,
            _source: &SourceImage,
            params: &RenderParams,
        ) -> Result<RgbImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Render {
                region: params.region,
                output_size: params.output_size,
            });
            Ok(RgbImage::new(params.output_size, params.output_size))
        }

        fn encode(&self, canvas: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: canvas.width(),
                height: canvas.height(),
                quality: quality.value(),
            });
            if self.fail_encode {
                return Err(BackendError::ProcessingFailed("mock encode failure".into()));
            }
            if self.empty_encode {
                return Ok(Vec::new());
            }
            Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_dimensions(320, 200);
        let source = backend.decode(&[1, 2, 3], "image/png").unwrap();
        assert_eq!(source.dimensions().as_tuple(), (320, 200));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode { mime, len: 3 } if mime == "image/png"));
    }

    #[test]
    fn mock_records_render_and_encode() {
        let backend = MockBackend::new();
        let source = backend.decode(&[0], "image/jpeg").unwrap();
        let canvas = backend
            .render(&source, &RenderParams::normalized(CropRegion::square(0, 0, 10)))
            .unwrap();
        backend.encode(&canvas, Quality::default()).unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(
            &ops[1],
            RecordedOp::Render {
                output_size: 2048,
                ..
            }
        ));
        assert!(matches!(&ops[2], RecordedOp::Encode { quality: 95, .. }));
    }

    #[test]
    fn mock_failing_encode_errors() {
        let backend = MockBackend::failing_encode();
        let result = backend.encode(&RgbImage::new(1, 1), Quality::default());
        assert!(result.is_err());
    }
}
