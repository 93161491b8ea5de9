//! Form binding: the two fields the server reads on submission.
//!
//! The binder holds at most one file and a delete-intent flag, and keeps them
//! exclusive: committing a file clears the flag, marking deleted clears the
//! file. [`FormSubmission`] is the value a multipart submit would carry.

use crate::config::FormConfig;
use crate::types::{CropResult, ImageCandidate, OUTPUT_FILENAME};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The single synthetic file placed in the file field.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct FormFile {
    pub name: String,
    pub mime: String,
    pub size: usize,
    #[serde(skip)]
    bytes: Arc<[u8]>,
}

impl FormFile {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FormFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .finish()
    }
}

/// Something ready to be committed to the form once its preview resolves.
#[derive(Debug, Clone)]
pub enum Upload {
    /// Normalized output of the crop editor.
    Cropped(CropResult),
    /// A validated file committed unedited (crop-optional mode).
    Raw(ImageCandidate),
}

impl Upload {
    pub fn mime(&self) -> &str {
        match self {
            Self::Cropped(result) => result.mime,
            Self::Raw(candidate) => candidate.mime(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Cropped(result) => &result.bytes,
            Self::Raw(candidate) => candidate.bytes(),
        }
    }
}

/// What the enclosing form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub file_field: String,
    pub delete_field: String,
    pub file: Option<FormFile>,
    pub delete: bool,
}

#[derive(Debug, Clone)]
pub struct FormBinder {
    names: FormConfig,
    file: Option<FormFile>,
    delete: bool,
}

/// Returned by [`FormBinder::mark_replacing`]: the host should open the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFilePicker;

impl FormBinder {
    pub fn new(names: &FormConfig) -> Self {
        Self {
            names: names.clone(),
            file: None,
            delete: false,
        }
    }

    /// Place the cropped result in the file field as `profile.jpg`.
    pub fn commit_file(&mut self, result: &CropResult) {
        self.commit(FormFile {
            name: OUTPUT_FILENAME.to_string(),
            mime: result.mime.to_string(),
            size: result.bytes.len(),
            bytes: Arc::from(result.bytes.as_slice()),
        });
    }

    /// Place an unedited candidate in the file field, keeping its own name and type.
    pub fn commit_raw(&mut self, candidate: &ImageCandidate) {
        self.commit(FormFile {
            name: candidate.name().to_string(),
            mime: candidate.mime().to_string(),
            size: candidate.size(),
            bytes: Arc::from(candidate.bytes()),
        });
    }

    pub fn commit_upload(&mut self, upload: &Upload) {
        match upload {
            Upload::Cropped(result) => self.commit_file(result),
            Upload::Raw(candidate) => self.commit_raw(candidate),
        }
    }

    fn commit(&mut self, file: FormFile) {
        tracing::debug!(name = %file.name, size = file.size, "file committed to form");
        self.file = Some(file);
        self.delete = false;
    }

    /// Set the delete intent and clear the file field. Idempotent.
    pub fn mark_deleted(&mut self) {
        self.file = None;
        self.delete = true;
    }

    /// Ask for a new file without touching what is committed.
    pub fn mark_replacing(&self) -> OpenFilePicker {
        OpenFilePicker
    }

    pub fn file(&self) -> Option<&FormFile> {
        self.file.as_ref()
    }

    pub fn delete_flag(&self) -> bool {
        self.delete
    }

    pub fn submission(&self) -> FormSubmission {
        FormSubmission {
            file_field: self.names.file_field.clone(),
            delete_field: self.names.delete_field.clone(),
            file: self.file.clone(),
            delete: self.delete,
        }
    }
}
