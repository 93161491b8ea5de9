//! Input gestures → one candidate file.
//!
//! The surface folds the native picker, drag-and-drop and the replace/delete
//! buttons into calls on a [`CandidateSink`]. It owns only the visual
//! "active drop target" affordance; everything else is the sink's business.

use crate::types::ImageCandidate;

/// A raw user gesture on the field.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// Click on the drop surface itself.
    SurfaceClick,
    /// The native file input changed.
    FilesChosen(Vec<ImageCandidate>),
    DragEnter,
    DragOver,
    DragLeave,
    Drop(Vec<ImageCandidate>),
    ReplaceClicked,
    DeleteClicked,
}

impl Gesture {
    fn is_drag(&self) -> bool {
        matches!(
            self,
            Self::DragEnter | Self::DragOver | Self::DragLeave | Self::Drop(_)
        )
    }
}

/// Receiver of the surface's normalized requests.
pub trait CandidateSink {
    /// Exactly one file was picked (browse, drop, or replace-triggered browse).
    fn candidate_selected(&mut self, candidate: ImageCandidate);
    /// The native file picker should be opened.
    fn open_file_picker(&mut self);
    fn replace_requested(&mut self);
    fn delete_requested(&mut self);
    /// Whether the drop zone is currently shown (clicks elsewhere are ignored).
    fn drop_zone_visible(&self) -> bool;
}

/// What the host must do with the native event after handling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceResponse {
    /// Suppress the platform's default handling (navigating to a dropped file).
    pub prevent_default: bool,
}

#[derive(Debug, Default)]
pub struct AcquisitionSurface {
    drop_active: bool,
}

impl AcquisitionSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The "active drop target" highlight.
    pub fn drop_active(&self) -> bool {
        self.drop_active
    }

    pub fn handle(&mut self, gesture: Gesture, sink: &mut impl CandidateSink) -> SurfaceResponse {
        let response = SurfaceResponse {
            prevent_default: gesture.is_drag(),
        };
        match gesture {
            Gesture::DragEnter | Gesture::DragOver => self.drop_active = true,
            Gesture::DragLeave => self.drop_active = false,
            Gesture::Drop(files) => {
                self.drop_active = false;
                if let Some(candidate) = first_file(files) {
                    sink.candidate_selected(candidate);
                }
            }
            Gesture::FilesChosen(files) => {
                if let Some(candidate) = first_file(files) {
                    sink.candidate_selected(candidate);
                }
            }
            Gesture::SurfaceClick => {
                if sink.drop_zone_visible() {
                    sink.open_file_picker();
                }
            }
            Gesture::ReplaceClicked => sink.replace_requested(),
            Gesture::DeleteClicked => sink.delete_requested(),
        }
        response
    }
}

/// Single-image field: keep the first file, drop the rest.
fn first_file(files: Vec<ImageCandidate>) -> Option<ImageCandidate> {
    let total = files.len();
    let first = files.into_iter().next();
    if total > 1 {
        tracing::debug!(ignored = total - 1, "extra files in selection ignored");
    }
    first
}
