//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` decoders; AVIF via `avif-parse` + `rav1d` |
//! | **Render crop** | `crop_imm` + `resize_exact` (Lanczos3) onto a 2048² canvas |
//! | **Encode** | `JpegEncoder` at quality 95 |
//!
//! The module is split into:
//! - **Calculations**: pure crop-box geometry (unit testable)
//! - **Parameters**: data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

mod avif;
pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceImage};
pub use calculations::{
    INITIAL_COVERAGE, clamp_region, initial_region, move_region, resize_region,
};
pub use params::{Quality, RenderParams};
pub use rust_backend::RustBackend;
