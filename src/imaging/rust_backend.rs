//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate decoders, EXIF orientation applied |
//! | Decode (AVIF) | `avif-parse` (container) + `rav1d` (AV1 decode) |
//! | Render crop | `DynamicImage::crop_imm` + `resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |

use super::avif;
use super::backend::{BackendError, ImageBackend, SourceImage};
use super::params::{Quality, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(mime: &str) -> bool {
    mime.trim().eq_ignore_ascii_case("image/avif")
}

/// Decode with the declared format when it is known, sniffing otherwise, and
/// apply the EXIF orientation so the crop box matches what the user sees.
fn decode_raster(bytes: &[u8], mime: &str) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    match ImageFormat::from_mime_type(mime) {
        Some(format) => reader.set_format(format),
        None => reader = reader.with_guessed_format()?,
    }
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read {mime}: {e}")))?;
    let orientation = decoder.orientation().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to read orientation: {e}"))
    })?;
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode {mime}: {e}")))?;
    img.apply_orientation(orientation);
    Ok(img)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, BackendError> {
        let img = if is_avif(mime) {
            avif::decode(bytes)?
        } else {
            decode_raster(bytes, mime)?
        };
        if img.width() == 0 || img.height() == 0 {
            return Err(BackendError::ProcessingFailed(
                "Decoded image has no pixels".into(),
            ));
        }
        Ok(SourceImage::new(img))
    }

    fn render(
        &self,
        source: &SourceImage,
        params: &RenderParams,
    ) -> Result<RgbImage, BackendError> {
        let region = params.region;
        let dims = source.dimensions();
        if region.is_empty() || params.output_size == 0 {
            return Err(BackendError::ProcessingFailed(
                "Cannot render a zero-area crop".into(),
            ));
        }
        if region.right() > dims.width || region.bottom() > dims.height {
            return Err(BackendError::ProcessingFailed(format!(
                "Crop {}x{}+{}+{} exceeds {}x{} source",
                region.width, region.height, region.x, region.y, dims.width, dims.height
            )));
        }

        let cropped = source
            .pixels()
            .crop_imm(region.x, region.y, region.width, region.height);
        let canvas =
            cropped.resize_exact(params.output_size, params.output_size, FilterType::Lanczos3);
        Ok(canvas.to_rgb8())
    }

    fn encode(&self, canvas: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
        canvas
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{encode_png_rgba, encode_test_jpeg};
    use crate::types::CropRegion;

    #[test]
    fn decode_synthetic_jpeg() {
        let bytes = encode_test_jpeg(200, 150);
        let source = RustBackend::new().decode(&bytes, "image/jpeg").unwrap();
        assert_eq!(source.dimensions().as_tuple(), (200, 150));
    }

    #[test]
    fn decode_sniffs_when_mime_unknown() {
        let bytes = encode_test_jpeg(20, 10);
        let source = RustBackend::new()
            .decode(&bytes, "application/octet-stream")
            .unwrap();
        assert_eq!(source.dimensions().as_tuple(), (20, 10));
    }

    #[test]
    fn decode_garbage_errors() {
        let result = RustBackend::new().decode(b"not an image", "image/png");
        assert!(result.is_err());
    }

    #[test]
    fn render_produces_exact_square() {
        let backend = RustBackend::new();
        let source = backend
            .decode(&encode_test_jpeg(300, 120), "image/jpeg")
            .unwrap();
        let canvas = backend
            .render(
                &source,
                &RenderParams {
                    region: CropRegion::square(10, 10, 100),
                    output_size: 64,
                },
            )
            .unwrap();
        assert_eq!(canvas.dimensions(), (64, 64));
    }

    #[test]
    fn render_zero_area_errors() {
        let backend = RustBackend::new();
        let source = backend
            .decode(&encode_test_jpeg(50, 50), "image/jpeg")
            .unwrap();
        let params = RenderParams::normalized(CropRegion::square(0, 0, 0));
        assert!(backend.render(&source, &params).is_err());
    }

    #[test]
    fn render_out_of_bounds_errors() {
        let backend = RustBackend::new();
        let source = backend
            .decode(&encode_test_jpeg(50, 50), "image/jpeg")
            .unwrap();
        let params = RenderParams::normalized(CropRegion::square(40, 0, 20));
        assert!(backend.render(&source, &params).is_err());
    }

    #[test]
    fn render_flattens_alpha_source() {
        let backend = RustBackend::new();
        let source = backend
            .decode(&encode_png_rgba(40, 40), "image/png")
            .unwrap();
        let canvas = backend
            .render(
                &source,
                &RenderParams {
                    region: CropRegion::square(0, 0, 40),
                    output_size: 16,
                },
            )
            .unwrap();
        assert_eq!(canvas.dimensions(), (16, 16));
    }

    #[test]
    fn encode_produces_jpeg() {
        let canvas = RgbImage::from_pixel(32, 32, image::Rgb([200, 40, 40]));
        let bytes = RustBackend::new().encode(&canvas, Quality::default()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let (w, h) = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .map(|img| (img.width(), img.height()))
            .unwrap();
        assert_eq!((w, h), (32, 32));
    }
}
