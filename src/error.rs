//! Error taxonomy of the intake pipeline.
//!
//! | Error | Raised by | Handling |
//! |---|---|---|
//! | [`ValidationError`] | [`validate`](crate::validate) | notice, candidate discarded, no state change |
//! | [`EncodingError`] | crop confirm / encode | notice, committed state kept, modal re-opened for retry |
//! | [`SessionError`] | confirm/cancel without a live session | logged, ignored |
//!
//! None of them is fatal to the field: every failure path leaves the last
//! known-good upload state in place.

use crate::imaging::BackendError;
use thiserror::Error;

pub use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("The crop area is empty. Drag the crop box over the photo and try again.")]
    ZeroArea,
    #[error("Could not read the image: {0}")]
    Decode(#[source] BackendError),
    #[error("Could not render the crop: {0}")]
    Render(#[source] BackendError),
    #[error("Could not encode the cropped image: {0}")]
    Encode(#[source] BackendError),
    #[error("The cropped image came back empty. Please try again.")]
    EmptyPayload,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("No crop session is open")]
    NoOpenSession,
    #[error("The crop is already being encoded")]
    EncodeInFlight,
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntakeError {
    /// Whether the user should be shown a blocking notice for this error.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Session(_))
    }
}
