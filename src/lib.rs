//! # Profile Photo
//!
//! A headless profile photo form field. It accepts a file (picker, drop, or
//! replace), validates it, lets the user crop it square, re-encodes the crop
//! as a 2048×2048 JPEG, and binds the result, or a delete intent, to the two
//! form fields the server reads on submission.
//!
//! The host (browser glue, desktop shell, or the bundled CLI) feeds the field
//! gestures and hands back the results of the work it was asked to do. The
//! field never blocks and never reaches for global state.
//!
//! # Pipeline
//!
//! ```text
//! gesture ─► acquisition ─► validate ─► session (crop) ─► encode ─► preview ─► form
//!                                     ▲                      │
//!                                     └── retry on failure ──┘
//! ```
//!
//! Delete goes straight to the form. Replace asks the host to reopen the picker.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`validate`] | MIME allow-list and 5 MiB ceiling → [`validate::ValidationVerdict`] |
//! | [`session`] | One square crop editor per source image; at most one open |
//! | [`imaging`] | Pure-Rust decode (incl. AVIF), crop render, JPEG encode |
//! | [`acquisition`] | Picker / drag-and-drop / buttons → one candidate |
//! | [`preview`] | Region visibility from [`types::UploadState`]; `data:` URL preview |
//! | [`form`] | File field + delete flag, never both set |
//! | [`field`] | [`field::ProfilePhotoField`]: owns the state, applies async outcomes |
//! | [`render`] | Maud markup for the field |
//! | [`config`] | `profile-photo.toml` loading and validation |
//! | [`intake`] | Driving files from disk through a field (CLI crop and batch) |
//! | [`output`] | CLI output formatting |
//! | [`error`] | Error taxonomy shared by the components |
//!
//! # Design Decisions
//!
//! ## Asynchronous Steps as Values
//!
//! Encoding a crop and decoding a preview are the two places the host may
//! suspend. Instead of callbacks, the field emits [`field::Effect::Encode`] and
//! [`field::Effect::DecodePreview`] jobs. Each job is tagged with the session
//! or preview generation it came from, and its outcome is only applied while
//! that origin is still live. A canceled crop can therefore never overwrite the
//! committed state, however late its encode finishes.
//!
//! ## State First, Visibility Derived
//!
//! [`types::UploadState`] is an explicit enum. What is shown is computed from it
//! by [`preview::Visibility::for_state`], so the "exactly one region" rule can be
//! tested without rendering anything.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and JPEG encoding use the `image` crate; AVIF
//! sources go through `avif-parse` and `rav1d`. No system libraries.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod imaging;
pub mod intake;
pub mod output;
pub mod preview;
pub mod render;
pub mod session;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
