//! Derived visibility and the live preview source.
//!
//! [`Visibility`] is a pure function of [`UploadState`] plus whether the crop
//! modal is open. The preview image source is a `data:` URL produced by a
//! [`PreviewJob`]; the controller swaps it in only when the job's generation
//! is still current, so a superseded decode never overwrites newer state and
//! the previous preview stays on screen until the new one is ready.

use crate::form::Upload;
use crate::types::UploadState;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

/// Which of the field's regions are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub drop_zone: bool,
    pub existing: bool,
    pub preview: bool,
    pub modal: bool,
}

impl Visibility {
    /// | state    | drop zone | existing | preview |
    /// |----------|-----------|----------|---------|
    /// | Empty    | ✓         |          |         |
    /// | Existing |           | ✓        |         |
    /// | Pending  |           |          | ✓       |
    /// | Deleted  | ✓         |          |         |
    ///
    /// The modal is an overlay, independent of the state.
    pub fn for_state(state: UploadState, modal_open: bool) -> Self {
        let (drop_zone, existing, preview) = match state {
            UploadState::Empty | UploadState::Deleted => (true, false, false),
            UploadState::Existing => (false, true, false),
            UploadState::Pending => (false, false, true),
        };
        Self {
            drop_zone,
            existing,
            preview,
            modal: modal_open,
        }
    }
}

/// Encode bytes as a `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Pending binary → data-URL decode for one upload.
#[derive(Debug)]
pub struct PreviewJob {
    generation: u64,
    upload: Upload,
}

impl PreviewJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run(self) -> PreviewOutcome {
        let url = data_url(self.upload.mime(), self.upload.bytes());
        PreviewOutcome {
            generation: self.generation,
            data_url: url,
            upload: self.upload,
        }
    }
}

/// Resolution of a [`PreviewJob`]. Carries the upload so the commit happens with it.
#[derive(Debug)]
pub struct PreviewOutcome {
    pub generation: u64,
    pub data_url: String,
    pub upload: Upload,
}

#[derive(Debug, Default)]
pub struct PreviewController {
    src: Option<String>,
    generation: u64,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current live-preview image source.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Start a decode for `upload`. Supersedes any decode still in flight.
    pub fn request(&mut self, upload: Upload) -> PreviewJob {
        self.generation += 1;
        PreviewJob {
            generation: self.generation,
            upload,
        }
    }

    /// Make any in-flight decode stale without starting a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Swap in the outcome's source if it is current; hands back the upload to commit.
    pub fn resolve(&mut self, outcome: PreviewOutcome) -> Option<Upload> {
        if !self.is_current(outcome.generation) {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "stale preview discarded"
            );
            return None;
        }
        self.src = Some(outcome.data_url);
        Some(outcome.upload)
    }
}
