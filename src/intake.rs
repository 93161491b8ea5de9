//! Running files from disk through the field, headless.
//!
//! Each file gets its own [`ProfilePhotoField`] and is driven exactly as a
//! user would drive it: pick the file, optionally move the crop box, confirm,
//! then let both asynchronous steps settle. What ends up in the form's file
//! field is the result.
//!
//! ## Parallel Processing
//!
//! [`intake_dir`] walks a directory with `walkdir` and processes the files in
//! parallel with rayon. Fields are independent, so each stays single-threaded;
//! only the backend is shared. [`write_batch`] then writes the results,
//! mirroring the source tree so files with the same name never overwrite
//! each other.

use crate::acquisition::Gesture;
use crate::config::FieldConfig;
use crate::error::SessionError;
use crate::field::{Effect, ProfilePhotoField};
use crate::form::{FormFile, FormSubmission};
use crate::imaging::ImageBackend;
use crate::types::{CropRegion, ImageCandidate};
use image::ImageFormat;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IntakeFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Nothing was committed to the form")]
    NotCommitted,
}

/// A file that made it into the form.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub file: FormFile,
    pub submission: FormSubmission,
}

/// Declared MIME type for a path, from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

pub fn read_candidate(path: &Path) -> Result<ImageCandidate, std::io::Error> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageCandidate::new(name, mime_for_path(path), bytes))
}

/// Settle `effects` and fail on the first user-visible notice.
fn settle_or_reject<B: ImageBackend>(
    field: &mut ProfilePhotoField<B>,
    effects: Vec<Effect>,
) -> Result<(), IntakeFileError> {
    for effect in field.settle(effects) {
        if let Effect::Notice(notice) = effect {
            return Err(IntakeFileError::Rejected(notice.message));
        }
    }
    Ok(())
}

/// Crop one file. `region` overrides the centered initial crop box.
pub fn intake_file<B: ImageBackend>(
    backend: B,
    config: &FieldConfig,
    path: &Path,
    region: Option<CropRegion>,
) -> Result<FileOutcome, IntakeFileError> {
    let candidate = read_candidate(path)?;
    let mut field = ProfilePhotoField::new(backend, config, None);

    let response = field.handle(Gesture::FilesChosen(vec![candidate]));
    settle_or_reject(&mut field, response.effects)?;

    if let Some(session) = field.session_mut() {
        if let Some(region) = region {
            session.set_region(region)?;
        }
        let response = field.confirm_crop();
        settle_or_reject(&mut field, response.effects)?;
    }

    let file = field.form().file().cloned().ok_or(IntakeFileError::NotCommitted)?;
    tracing::info!(source = %path.display(), size = file.size, "intake complete");
    Ok(FileOutcome {
        source: path.to_path_buf(),
        file,
        submission: field.submission(),
    })
}

/// Image-looking files under `dir`, sorted for stable output.
pub fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| ImageFormat::from_path(p).is_ok())
        .collect();
    paths.sort();
    paths
}

/// Process every image under `dir` in parallel. Results keep [`discover`] order.
pub fn intake_dir<B: ImageBackend>(
    backend: &B,
    config: &FieldConfig,
    dir: &Path,
) -> Vec<(PathBuf, Result<FileOutcome, IntakeFileError>)> {
    discover(dir)
        .into_par_iter()
        .map(|path| {
            let result = intake_file(backend, config, &path, None);
            if let Err(err) = &result {
                tracing::warn!(source = %path.display(), error = %err, "intake failed");
            }
            (path, result)
        })
        .collect()
}

/// Output file name for an outcome: the source stem plus the payload's
/// extension. Cropped output is always `.jpg`; raw files keep their own.
fn output_name(outcome: &FileOutcome) -> (String, String) {
    let stem = outcome
        .source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string());
    let ext = Path::new(&outcome.file.name)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jpg".to_string());
    (stem, ext)
}

fn write_to(outcome: &FileOutcome, target: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, outcome.file.bytes())
}

/// Write an outcome's bytes into `out_dir`, named after the source file.
pub fn write_outcome(outcome: &FileOutcome, out_dir: &Path) -> Result<PathBuf, std::io::Error> {
    let (stem, ext) = output_name(outcome);
    let target = out_dir.join(format!("{stem}.{ext}"));
    write_to(outcome, &target)?;
    Ok(target)
}

/// Write a batch under `out_dir`, mirroring each source's directory below
/// `root`.
///
/// Sources that would land on the same target (`me.png` and `me.jpg` both
/// crop to `me.jpg`) keep the first target; later ones get the source
/// extension folded into the stem (`me-png.jpg`). If that name is taken as
/// well, the entry fails instead of overwriting.
pub fn write_batch(
    root: &Path,
    results: Vec<(PathBuf, Result<FileOutcome, IntakeFileError>)>,
    out_dir: &Path,
) -> Vec<(PathBuf, Result<PathBuf, String>)> {
    let mut taken: HashSet<PathBuf> = HashSet::new();
    results
        .into_iter()
        .map(|(source, result)| {
            let written = result.map_err(|e| e.to_string()).and_then(|outcome| {
                let target = batch_target(root, &outcome, out_dir, &taken)?;
                write_to(&outcome, &target).map_err(|e| e.to_string())?;
                taken.insert(target.clone());
                Ok(target)
            });
            (source, written)
        })
        .collect()
}

fn batch_target(
    root: &Path,
    outcome: &FileOutcome,
    out_dir: &Path,
    taken: &HashSet<PathBuf>,
) -> Result<PathBuf, String> {
    let relative_dir = outcome
        .source
        .parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .unwrap_or_else(|| Path::new(""));
    let dir = out_dir.join(relative_dir);
    let (stem, ext) = output_name(outcome);

    let target = dir.join(format!("{stem}.{ext}"));
    if !taken.contains(&target) {
        return Ok(target);
    }
    let source_ext = outcome
        .source
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let fallback = dir.join(format!("{stem}-{source_ext}.{ext}"));
    if taken.contains(&fallback) {
        return Err(format!("{} is already taken by another file", fallback.display()));
    }
    tracing::debug!(
        source = %outcome.source.display(),
        target = %fallback.display(),
        "output name collides, renaming"
    );
    Ok(fallback)
}
