//! In-memory AVIF decoding: `avif-parse` for the container, `rav1d` for AV1.
//!
//! The `image` crate's `"avif"` feature only provides the encoder; its
//! decoder needs the C `dav1d` library. `rav1d` is the pure Rust port, driven
//! here through its C-compatible API.

use super::backend::BackendError;
use image::{DynamicImage, Limits, RgbImage};
use std::io::Cursor;
use std::ptr::NonNull;

fn failed(msg: impl Into<String>) -> BackendError {
    BackendError::ProcessingFailed(msg.into())
}

/// Decode the primary item of an AVIF file held in memory.
pub(crate) fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::dav1d::Dav1dSettings;

    let avif = avif_parse::read_avif(&mut Cursor::new(bytes))
        .map_err(|e| failed(format!("Failed to parse AVIF container: {e:?}")))?;
    let av1: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let settings_ptr =
        NonNull::new(settings.as_mut_ptr()).ok_or_else(|| failed("rav1d settings pointer"))?;
    unsafe { rav1d::src::lib::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(failed(format!("rav1d open failed ({})", rc.0)));
    }

    // Every exit past this point goes through the single close below.
    let decoded = (|| {
        use rav1d::include::dav1d::data::Dav1dData;
        use rav1d::include::dav1d::picture::Dav1dPicture;

        let mut data = Dav1dData::default();
        let buf = unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
        if buf.is_null() {
            return Err(failed("rav1d data_create failed"));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf, av1.len()) };

        let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data)) };
            return Err(failed(format!("rav1d send_data failed ({})", rc.0)));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(failed(format!("rav1d get_picture failed ({})", rc.0)));
        }
        let rgb = picture_to_rgb(&pic);
        unsafe { rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic)) };
        rgb
    })();

    unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
    decoded.map(DynamicImage::ImageRgb8)
}

/// Apply the `image` crate's default decode limits to a picture's declared
/// size, since this path bypasses `ImageReader`.
fn check_limits(width: u32, height: u32) -> Result<(), BackendError> {
    let limits = Limits::default();
    limits
        .check_dimensions(width, height)
        .map_err(|e| failed(format!("AVIF picture exceeds limits: {e}")))?;
    let needed = u64::from(width) * u64::from(height) * 3;
    if let Some(max) = limits.max_alloc {
        if needed > max {
            return Err(failed(format!(
                "AVIF picture {width}x{height} needs {needed} bytes, limit is {max}"
            )));
        }
    }
    Ok(())
}

/// Copy a decoded picture's YUV planes into an interleaved RGB8 image.
fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<RgbImage, BackendError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let plane = |i: usize| {
        pic.data[i]
            .map(|p| p.as_ptr() as *const u8)
            .ok_or_else(|| failed(format!("AVIF picture is missing plane {i}")))
    };

    let layout = pic.p.layout;
    let (subsample, monochrome) = match layout {
        DAV1D_PIXEL_LAYOUT_I400 => ((false, false), true),
        DAV1D_PIXEL_LAYOUT_I420 => ((true, true), false),
        DAV1D_PIXEL_LAYOUT_I422 => ((true, false), false),
        DAV1D_PIXEL_LAYOUT_I444 => ((false, false), false),
        other => return Err(failed(format!("Unsupported AVIF pixel layout: {other}"))),
    };

    let y = plane(0)?;
    let (u, v) = if monochrome {
        (y, y)
    } else {
        (plane(1)?, plane(2)?)
    };

    let planes = Planes {
        y,
        u,
        v,
        y_stride: pic.stride[0],
        uv_stride: if monochrome { 0 } else { pic.stride[1] },
        bpc: pic.p.bpc as u32,
        subsample,
        monochrome,
    };
    let (width, height) = (pic.p.w as u32, pic.p.h as u32);
    check_limits(width, height)?;
    Ok(RgbImage::from_fn(width, height, |col, row| {
        image::Rgb(planes.rgb_at(col, row))
    }))
}

/// Borrowed view of decoded YUV planes.
struct Planes {
    y: *const u8,
    u: *const u8,
    v: *const u8,
    y_stride: isize,
    uv_stride: isize,
    bpc: u32,
    /// Chroma subsampling (horizontal, vertical); I420 is (true, true).
    subsample: (bool, bool),
    monochrome: bool,
}

impl Planes {
    /// BT.601 YCbCr → RGB for one pixel, scaled to 8 bits.
    fn rgb_at(&self, col: u32, row: u32) -> [u8; 3] {
        let max = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max;
        let to_u8 = |v: f32| (v * scale).clamp(0.0, 255.0) as u8;

        let luma = self.sample(self.y, self.y_stride, col, row);
        if self.monochrome {
            let g = to_u8(luma);
            return [g, g, g];
        }

        let c_col = if self.subsample.0 { col / 2 } else { col };
        let c_row = if self.subsample.1 { row / 2 } else { row };
        let cb = self.sample(self.u, self.uv_stride, c_col, c_row) - center;
        let cr = self.sample(self.v, self.uv_stride, c_col, c_row) - center;

        [
            to_u8(luma + 1.402 * cr),
            to_u8(luma - 0.344136 * cb - 0.714136 * cr),
            to_u8(luma + 1.772 * cb),
        ]
    }

    /// Read one sample; 10- and 12-bit content is stored as u16.
    #[inline]
    fn sample(&self, ptr: *const u8, stride: isize, x: u32, y: u32) -> f32 {
        let row = y as isize * stride;
        if self.bpc <= 8 {
            (unsafe { *ptr.offset(row + x as isize) }) as f32
        } else {
            (unsafe { (ptr.offset(row + x as isize * 2) as *const u16).read_unaligned() }) as f32
        }
    }
}
