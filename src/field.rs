//! The profile photo field: state owner and component wiring.
//!
//! [`ProfilePhotoField`] holds the single [`UploadState`] and routes every
//! gesture through the components:
//!
//! ```text
//! Gesture ─► AcquisitionSurface ─► validate ─► SessionSlot::open ─► (modal)
//!                                                     │ confirm_crop
//!                                                     ▼
//!                                Effect::Encode(EncodeJob)  ── host runs ──► apply_encode
//!                                                     │
//!                                Effect::DecodePreview(PreviewJob) ─ runs ─► apply_preview
//!                                                     │
//!                                  FormBinder::commit + UploadState::Pending + preview src
//! ```
//!
//! The two jobs are the asynchronous boundaries. The host may run them
//! anywhere, any time later, and hand the outcome back. Outcomes are applied
//! only while their origin is live (the session is still open, the preview
//! generation is still current); anything else is dropped. State is never
//! changed before a job has produced its data.
//!
//! Delete is synchronous. Replace only asks the host to open the picker.

use crate::acquisition::{AcquisitionSurface, CandidateSink, Gesture};
use crate::config::{CropMode, FieldConfig};
use crate::error::{EncodingError, IntakeError, SessionError};
use crate::form::{FormBinder, FormSubmission, OpenFilePicker, Upload};
use crate::imaging::ImageBackend;
use crate::preview::{PreviewController, PreviewJob, PreviewOutcome, Visibility};
use crate::session::{CropSession, EncodeJob, EncodeOutcome, SessionSlot};
use crate::types::{CropRegion, ImageCandidate, UploadState};
use crate::validate::validate;
use serde::Serialize;
use std::collections::VecDeque;

/// A blocking, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl From<&IntakeError> for Notice {
    fn from(err: &IntakeError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Work the host must perform on the field's behalf.
#[derive(Debug)]
pub enum Effect {
    OpenFilePicker,
    Notice(Notice),
    /// New interactive controls were injected; icons need re-rendering.
    IconRefresh,
    Encode(EncodeJob),
    DecodePreview(PreviewJob),
}

impl From<OpenFilePicker> for Effect {
    fn from(_: OpenFilePicker) -> Self {
        Effect::OpenFilePicker
    }
}

#[derive(Debug, Default)]
pub struct Response {
    /// Suppress the platform default for the triggering event.
    pub prevent_default: bool,
    pub effects: Vec<Effect>,
}

/// The crop modal's contents.
#[derive(Debug, Clone, Serialize)]
pub struct CropView {
    pub region: CropRegion,
    pub image_width: u32,
    pub image_height: u32,
    pub encoding: bool,
}

/// Everything needed to draw the field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub state: UploadState,
    pub visibility: Visibility,
    pub drop_active: bool,
    pub existing_url: Option<String>,
    #[serde(skip)]
    pub preview_src: Option<String>,
    pub crop: Option<CropView>,
    pub submission: FormSubmission,
}

pub struct ProfilePhotoField<B: ImageBackend> {
    backend: B,
    mode: CropMode,
    state: UploadState,
    existing_url: Option<String>,
    surface: AcquisitionSurface,
    sessions: SessionSlot,
    preview: PreviewController,
    form: FormBinder,
    /// Effects raised from inside sink callbacks, drained into each response.
    pending: Vec<Effect>,
}

impl<B: ImageBackend> ProfilePhotoField<B> {
    /// `existing_url` is the profile's current image, if it has one.
    pub fn new(backend: B, config: &FieldConfig, existing_url: Option<String>) -> Self {
        let state = UploadState::initial(existing_url.is_some());
        Self {
            backend,
            mode: config.crop.mode,
            state,
            existing_url,
            surface: AcquisitionSurface::new(),
            sessions: SessionSlot::new(),
            preview: PreviewController::new(),
            form: FormBinder::new(&config.form),
            pending: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn form(&self) -> &FormBinder {
        &self.form
    }

    pub fn submission(&self) -> FormSubmission {
        self.form.submission()
    }

    pub fn session(&self) -> Option<&CropSession> {
        self.sessions.current()
    }

    /// The open crop session, for drag/resize of the crop box.
    pub fn session_mut(&mut self) -> Option<&mut CropSession> {
        self.sessions.current_mut()
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::for_state(self.state, self.sessions.is_open())
    }

    pub fn view(&self) -> FieldView {
        FieldView {
            state: self.state,
            visibility: self.visibility(),
            drop_active: self.surface.drop_active(),
            existing_url: self.existing_url.clone(),
            preview_src: self.preview.src().map(str::to_owned),
            crop: self.sessions.current().map(|s| {
                let dims = s.dimensions();
                CropView {
                    region: s.region(),
                    image_width: dims.width,
                    image_height: dims.height,
                    encoding: s.is_encoding(),
                }
            }),
            submission: self.form.submission(),
        }
    }

    fn respond(&mut self, prevent_default: bool) -> Response {
        Response {
            prevent_default,
            effects: std::mem::take(&mut self.pending),
        }
    }

    fn notify(&mut self, err: IntakeError) {
        if err.is_user_visible() {
            self.pending.push(Effect::Notice(Notice::from(&err)));
        } else {
            tracing::debug!(error = %err, "ignored");
        }
    }

    /// Feed one user gesture through the acquisition surface.
    pub fn handle(&mut self, gesture: Gesture) -> Response {
        let mut surface = std::mem::take(&mut self.surface);
        let surface_response = surface.handle(gesture, self);
        self.surface = surface;
        self.respond(surface_response.prevent_default)
    }

    /// The crop modal's confirm button.
    pub fn confirm_crop(&mut self) -> Response {
        let confirmed = match self.sessions.current_mut() {
            Some(session) => session.confirm(&self.backend),
            None => Err(SessionError::NoOpenSession.into()),
        };
        match confirmed {
            Ok(job) => {
                tracing::info!(session = %job.session(), "crop confirmed");
                self.pending.push(Effect::Encode(job));
            }
            Err(err) => self.notify(err),
        }
        self.respond(false)
    }

    /// The crop modal's cancel button.
    pub fn cancel_crop(&mut self) -> Response {
        match self.sessions.cancel() {
            Ok(id) => tracing::info!(session = %id, "crop canceled"),
            Err(err) => self.notify(err.into()),
        }
        self.respond(false)
    }

    /// Apply a finished encode. Dropped if its session was canceled or replaced.
    pub fn apply_encode(&mut self, outcome: EncodeOutcome) -> Response {
        let Some(mut session) = self.sessions.take_live(outcome.session) else {
            tracing::debug!(session = %outcome.session, "stale encode discarded");
            return self.respond(false);
        };
        match outcome.result {
            Ok(result) => {
                session.destroy();
                let job = self.preview.request(Upload::Cropped(result));
                self.pending.push(Effect::DecodePreview(job));
            }
            Err(err) => {
                tracing::warn!(session = %session.id(), error = %err, "crop encode failed");
                let retry = session.source().cloned().map(|s| (s, session.region()));
                session.destroy();
                self.notify(err.into());
                if let Some((source, region)) = retry {
                    self.sessions.reopen(source, region);
                    self.pending.push(Effect::IconRefresh);
                }
            }
        }
        self.respond(false)
    }

    /// Apply a finished preview decode: commit to the form and go `Pending`.
    pub fn apply_preview(&mut self, outcome: PreviewOutcome) -> Response {
        if let Some(upload) = self.preview.resolve(outcome) {
            self.form.commit_upload(&upload);
            self.set_state(UploadState::Pending);
        }
        self.respond(false)
    }

    /// Run every job in `effects` to completion in place, applying the outcomes.
    ///
    /// Returns the effects left for the host (notices, picker, icon refresh).
    pub fn settle(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut queue = VecDeque::from(effects);
        let mut rest = Vec::new();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Encode(job) => {
                    let outcome = job.run(&self.backend);
                    queue.extend(self.apply_encode(outcome).effects);
                }
                Effect::DecodePreview(job) => {
                    queue.extend(self.apply_preview(job.run()).effects);
                }
                other => rest.push(other),
            }
        }
        rest
    }

    fn set_state(&mut self, state: UploadState) {
        if self.state != state {
            tracing::info!(from = %self.state, to = %state, "upload state changed");
            self.state = state;
        }
    }
}

impl<B: ImageBackend> CandidateSink for ProfilePhotoField<B> {
    fn candidate_selected(&mut self, candidate: ImageCandidate) {
        if let Err(err) = validate(&candidate).into_result() {
            tracing::info!(name = candidate.name(), error = %err, "candidate rejected");
            self.notify(err.into());
            return;
        }
        self.preview.invalidate();

        match self.backend.decode(candidate.bytes(), candidate.mime()) {
            Ok(source) => {
                self.sessions.open(source);
                self.pending.push(Effect::IconRefresh);
            }
            Err(err) if self.mode == CropMode::Optional => {
                tracing::info!(
                    name = candidate.name(),
                    error = %err,
                    "committing file without crop"
                );
                self.sessions.destroy();
                let job = self.preview.request(Upload::Raw(candidate));
                self.pending.push(Effect::DecodePreview(job));
            }
            Err(err) => self.notify(EncodingError::Decode(err).into()),
        }
    }

    fn open_file_picker(&mut self) {
        self.pending.push(Effect::OpenFilePicker);
    }

    fn replace_requested(&mut self) {
        let request = self.form.mark_replacing();
        self.pending.push(request.into());
    }

    fn delete_requested(&mut self) {
        self.preview.invalidate();
        self.form.mark_deleted();
        self.set_state(UploadState::Deleted);
    }

    fn drop_zone_visible(&self) -> bool {
        self.visibility().drop_zone
    }
}
