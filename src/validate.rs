//! Candidate validation: pure metadata inspection, no decoding.
//!
//! Rules are applied in order and the first failure wins:
//!
//! 1. The declared MIME type must be in [`ALLOWED_TYPES`].
//! 2. The byte size must not exceed [`MAX_BYTES`] (5 MiB).
//! 3. The file must not be empty.
//!
//! Accepting a candidate has no side effect; the caller decides what to do
//! with the verdict.

use crate::types::ImageCandidate;
use thiserror::Error;

/// MIME types the crop backend can decode.
pub const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/avif"];

/// Upper bound on the candidate's byte size.
pub const MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported file type {mime:?}. Please choose a JPEG, PNG, WebP or AVIF image.")]
    UnsupportedType { mime: String },
    #[error("File is too large ({size} bytes). The maximum size is 5 MB.")]
    TooLarge { size: usize },
    #[error("File is empty.")]
    Empty,
}

/// Outcome of checking a candidate.
///
/// `reason` is present iff `accepted` is false; the constructors are the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    accepted: bool,
    reason: Option<ValidationError>,
}

impl ValidationVerdict {
    fn accept() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    fn reject(reason: ValidationError) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn reason(&self) -> Option<&ValidationError> {
        self.reason.as_ref()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.reason {
            None => Ok(()),
            Some(reason) => Err(reason),
        }
    }
}

/// Strip parameters (`; charset=...`) and normalize case.
fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Whether a declared MIME type is in the allow-list.
pub fn is_allowed_type(mime: &str) -> bool {
    let essence = essence(mime);
    ALLOWED_TYPES.contains(&essence.as_str())
}

/// Check a candidate against the type allow-list and the size ceiling.
pub fn validate(candidate: &ImageCandidate) -> ValidationVerdict {
    if !is_allowed_type(candidate.mime()) {
        return ValidationVerdict::reject(ValidationError::UnsupportedType {
            mime: candidate.mime().to_string(),
        });
    }
    if candidate.size() > MAX_BYTES {
        return ValidationVerdict::reject(ValidationError::TooLarge {
            size: candidate.size(),
        });
    }
    if candidate.size() == 0 {
        return ValidationVerdict::reject(ValidationError::Empty);
    }
    ValidationVerdict::accept()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mime: &str, size: usize) -> ImageCandidate {
        ImageCandidate::new("photo", mime, vec![0u8; size])
    }

    #[test]
    fn accepts_every_allowed_type() {
        for mime in ALLOWED_TYPES {
            let verdict = validate(&candidate(mime, 1024));
            assert!(verdict.accepted(), "{mime} should be accepted");
            assert!(verdict.reason().is_none());
        }
    }

    #[test]
    fn rejects_gif_naming_allowed_formats() {
        let verdict = validate(&candidate("image/gif", 1024));
        assert!(!verdict.accepted());
        let message = verdict.reason().unwrap().to_string();
        assert!(message.contains("JPEG, PNG, WebP or AVIF"), "{message}");
        assert!(message.contains("image/gif"));
    }

    #[test]
    fn rejects_non_image_type() {
        let verdict = validate(&candidate("application/pdf", 10));
        assert!(matches!(
            verdict.reason(),
            Some(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn mime_match_ignores_case_and_parameters() {
        assert!(is_allowed_type("IMAGE/JPEG"));
        assert!(is_allowed_type("image/png; charset=binary"));
        assert!(!is_allowed_type("image/jpg"));
        assert!(!is_allowed_type(""));
    }

    #[test]
    fn rejects_six_megabyte_jpeg_naming_ceiling() {
        let verdict = validate(&candidate("image/jpeg", 6 * 1024 * 1024));
        assert!(!verdict.accepted());
        let message = verdict.reason().unwrap().to_string();
        assert!(message.contains("5 MB"), "{message}");
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(validate(&candidate("image/png", MAX_BYTES)).accepted());
        assert!(!validate(&candidate("image/png", MAX_BYTES + 1)).accepted());
    }

    #[test]
    fn type_rule_wins_over_size_rule() {
        let verdict = validate(&candidate("image/gif", MAX_BYTES + 1));
        assert!(matches!(
            verdict.reason(),
            Some(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn rejects_empty_file() {
        let verdict = validate(&candidate("image/png", 0));
        assert_eq!(verdict.into_result(), Err(ValidationError::Empty));
    }

    #[test]
    fn accepted_verdict_converts_to_ok() {
        assert_eq!(validate(&candidate("image/webp", 5)).into_result(), Ok(()));
    }
}
