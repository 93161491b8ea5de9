//! Interactive crop sessions.
//!
//! A [`CropSession`] wraps one decoded source image in a square crop box.
//! Sessions live in a [`SessionSlot`], which enforces that at most one is
//! open: opening a new session destroys the current one first.
//!
//! ```text
//! SessionSlot::open(source) ──► CropSession (open)
//!      │  move_to / resize_to / set_region   (box stays square, inside image)
//!      │
//!      ├─ confirm(backend) ──► EncodeJob ──run──► EncodeOutcome { session, result }
//!      │                         (session stays open until the outcome is applied)
//!      └─ cancel() ──► destroyed, no result
//! ```
//!
//! Encoding is the asynchronous half of a confirm. The job carries the id of
//! the session that produced it, so the owner can drop the outcome if that
//! session was canceled or replaced in the meantime ([`SessionSlot::take_live`]).

use crate::error::{EncodingError, IntakeError, SessionError};
use crate::imaging::{
    self, Dimensions, ImageBackend, Quality, RenderParams, SourceImage, INITIAL_COVERAGE,
};
use crate::types::{CropRegion, CropResult, OUTPUT_MIME};
use image::RgbImage;
use std::fmt;

/// Identity of one crop session, unique within its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One live crop editor bound to one source image.
#[derive(Debug)]
pub struct CropSession {
    id: SessionId,
    /// `None` once destroyed.
    source: Option<SourceImage>,
    dims: Dimensions,
    region: CropRegion,
    encoding: bool,
}

impl CropSession {
    fn new(id: SessionId, source: SourceImage) -> Self {
        let dims = source.dimensions();
        let region = imaging::initial_region(dims.as_tuple(), INITIAL_COVERAGE);
        Self {
            id,
            source: Some(source),
            dims,
            region,
            encoding: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// True between [`confirm`](Self::confirm) and the end of the session.
    pub fn is_encoding(&self) -> bool {
        self.encoding
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn editable(&self) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::NoOpenSession);
        }
        if self.encoding {
            return Err(SessionError::EncodeInFlight);
        }
        Ok(())
    }

    /// Replace the crop box; it is squared and confined to the image.
    pub fn set_region(&mut self, region: CropRegion) -> Result<CropRegion, SessionError> {
        self.editable()?;
        self.region = imaging::clamp_region(region, self.dims.as_tuple());
        Ok(self.region)
    }

    /// Drag the crop box to a new origin.
    pub fn move_to(&mut self, x: u32, y: u32) -> Result<CropRegion, SessionError> {
        self.editable()?;
        self.region = imaging::move_region(self.region, x, y, self.dims.as_tuple());
        Ok(self.region)
    }

    /// Resize the crop box around its center.
    pub fn resize_to(&mut self, size: u32) -> Result<CropRegion, SessionError> {
        self.editable()?;
        self.region = imaging::resize_region(self.region, size, self.dims.as_tuple());
        Ok(self.region)
    }

    /// Render the crop onto the 2048×2048 canvas and hand back the encode step.
    ///
    /// The session stays open (and the box locked) until its owner applies
    /// the job's outcome, so a cancel in between can still be observed.
    pub fn confirm(&mut self, backend: &impl ImageBackend) -> Result<EncodeJob, IntakeError> {
        self.editable()?;
        let source = self.source.as_ref().ok_or(SessionError::NoOpenSession)?;
        if self.region.is_empty() {
            return Err(EncodingError::ZeroArea.into());
        }
        let canvas = backend
            .render(source, &RenderParams::normalized(self.region))
            .map_err(EncodingError::Render)?;
        self.encoding = true;
        tracing::debug!(session = %self.id, region = ?self.region, "crop rendered, encode pending");
        Ok(EncodeJob {
            session: self.id,
            canvas,
            quality: Quality::default(),
        })
    }

    /// Release the editor's resources. Repeated calls are no-ops.
    pub fn destroy(&mut self) {
        if self.source.take().is_some() {
            self.encoding = false;
            tracing::debug!(session = %self.id, "crop session destroyed");
        }
    }
}

impl Drop for CropSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// The pending encode half of a confirmed crop.
pub struct EncodeJob {
    session: SessionId,
    canvas: RgbImage,
    quality: Quality,
}

impl fmt::Debug for EncodeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeJob")
            .field("session", &self.session)
            .field("canvas", &self.canvas.dimensions())
            .field("quality", &self.quality)
            .finish()
    }
}

impl EncodeJob {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Encode the canvas. An empty payload is an error, never a blank result.
    pub fn run(self, backend: &impl ImageBackend) -> EncodeOutcome {
        let result = backend
            .encode(&self.canvas, self.quality)
            .map_err(EncodingError::Encode)
            .and_then(|bytes| {
                if bytes.is_empty() {
                    return Err(EncodingError::EmptyPayload);
                }
                Ok(CropResult {
                    bytes,
                    mime: OUTPUT_MIME,
                    width: self.canvas.width(),
                    height: self.canvas.height(),
                })
            });
        EncodeOutcome {
            session: self.session,
            result,
        }
    }
}

/// Resolution of an [`EncodeJob`], tagged with its originating session.
#[derive(Debug)]
pub struct EncodeOutcome {
    pub session: SessionId,
    pub result: Result<CropResult, EncodingError>,
}

/// Owner of the (at most one) open crop session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<CropSession>,
    next_id: u64,
    destroyed: u64,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session on `source`, destroying any session already open.
    pub fn open(&mut self, source: SourceImage) -> &mut CropSession {
        self.destroy();
        self.next_id += 1;
        let session = CropSession::new(SessionId(self.next_id), source);
        tracing::debug!(session = %session.id, dims = ?session.dims, "crop session opened");
        self.current.insert(session)
    }

    /// Open a session and restore a previous crop box (retry after a failed encode).
    pub fn reopen(&mut self, source: SourceImage, region: CropRegion) -> &mut CropSession {
        let session = self.open(source);
        if !region.is_empty() {
            session.region = imaging::clamp_region(region, session.dims.as_tuple());
        }
        session
    }

    pub fn current(&self) -> Option<&CropSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CropSession> {
        self.current.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Whether `id` is the session currently open.
    pub fn is_live(&self, id: SessionId) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == id)
    }

    /// Remove the session `id` from the slot if it is still the open one.
    ///
    /// The caller becomes responsible for destroying it.
    pub fn take_live(&mut self, id: SessionId) -> Option<CropSession> {
        if self.is_live(id) {
            self.current.take()
        } else {
            None
        }
    }

    /// Close the open session without a result.
    pub fn cancel(&mut self) -> Result<SessionId, SessionError> {
        let id = self
            .current
            .as_ref()
            .map(|s| s.id)
            .ok_or(SessionError::NoOpenSession)?;
        self.destroy();
        Ok(id)
    }

    /// Destroy the open session, if any.
    pub fn destroy(&mut self) {
        if let Some(mut session) = self.current.take() {
            session.destroy();
            self.destroyed += 1;
        }
    }

    /// Number of sessions this slot has destroyed.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}
