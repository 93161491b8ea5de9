//! CLI output formatting.
//!
//! Every command has a pure `format_*` function returning lines, and a thin
//! `print_*` wrapper. Tests exercise the formatters directly.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! me.jpg (image/jpeg, 1.3 MB)
//!     accepted
//! anim.gif (image/gif, 88.0 KB)
//!     rejected: Unsupported file type "image/gif". Please choose a JPEG, PNG, WebP or AVIF image.
//! gone.png
//!     unreadable: No such file or directory (os error 2)
//! ```
//!
//! ## Crop / Batch
//!
//! ```text
//! me.jpg → out/me.jpg
//!     profile.jpg: image/jpeg, 412.5 KB
//!     form: image=profile.jpg delete_image=false
//! anim.gif
//!     failed: Unsupported file type "image/gif". ...
//!
//! 1 committed, 1 failed
//! ```

use crate::form::FormSubmission;
use crate::intake::{FileOutcome, IntakeFileError, read_candidate};
use crate::types::ImageCandidate;
use crate::validate::{ValidationVerdict, validate};
use std::path::{Path, PathBuf};

/// Human-readable byte size: `512 B`, `88.0 KB`, `1.3 MB`.
pub fn human_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn form_line(submission: &FormSubmission) -> String {
    let file = submission
        .file
        .as_ref()
        .map(|f| f.name.as_str())
        .unwrap_or("(empty)");
    format!(
        "    form: {}={} {}={}",
        submission.file_field, file, submission.delete_field, submission.delete
    )
}

pub fn format_check(candidate: &ImageCandidate, verdict: &ValidationVerdict) -> Vec<String> {
    let header = format!(
        "{} ({}, {})",
        candidate.name(),
        candidate.mime(),
        human_size(candidate.size())
    );
    let status = match verdict.reason() {
        None => "    accepted".to_string(),
        Some(reason) => format!("    rejected: {reason}"),
    };
    vec![header, status]
}

/// Read and check each path in turn. An unreadable path gets its own lines
/// and the run carries on with the next one.
pub fn format_check_paths(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .flat_map(|path| match read_candidate(path) {
            Ok(candidate) => format_check(&candidate, &validate(&candidate)),
            Err(err) => format_unreadable(path, &err),
        })
        .collect()
}

pub fn print_check_paths(paths: &[PathBuf]) {
    for line in format_check_paths(paths) {
        println!("{}", line);
    }
}

pub fn format_unreadable(path: &Path, err: &std::io::Error) -> Vec<String> {
    vec![display_name(path), format!("    unreadable: {err}")]
}

pub fn format_outcome(outcome: &FileOutcome, written: Option<&Path>) -> Vec<String> {
    let mut header = display_name(&outcome.source);
    if let Some(target) = written {
        header.push_str(&format!(" → {}", target.display()));
    }
    vec![
        header,
        format!(
            "    {}: {}, {}",
            outcome.file.name,
            outcome.file.mime,
            human_size(outcome.file.size)
        ),
        form_line(&outcome.submission),
    ]
}

pub fn format_failure(source: &Path, err: &IntakeFileError) -> Vec<String> {
    vec![display_name(source), format!("    failed: {err}")]
}

/// One row per batch entry, then a summary line.
pub fn format_batch(results: &[(PathBuf, Result<PathBuf, String>)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (source, result) in results {
        match result {
            Ok(target) => lines.push(format!("{} → {}", display_name(source), target.display())),
            Err(msg) => {
                failed += 1;
                lines.push(display_name(source));
                lines.push(format!("    failed: {msg}"));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{} committed, {} failed",
        results.len() - failed,
        failed
    ));
    lines
}

pub fn print_batch(results: &[(PathBuf, Result<PathBuf, String>)]) {
    for line in format_batch(results) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormConfig;
    use crate::form::FormBinder;
    use crate::types::{CropResult, OUTPUT_MIME};
    use tempfile::TempDir;

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(90_112), "88.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn check_accepted() {
        let c = ImageCandidate::new("me.jpg", "image/jpeg", vec![0u8; 2048]);
        let lines = format_check(&c, &validate(&c));
        assert_eq!(lines, vec!["me.jpg (image/jpeg, 2.0 KB)", "    accepted"]);
    }

    #[test]
    fn check_rejected_names_reason() {
        let c = ImageCandidate::new("anim.gif", "image/gif", vec![0u8; 10]);
        let lines = format_check(&c, &validate(&c));
        assert!(lines[1].starts_with("    rejected: "));
        assert!(lines[1].contains("JPEG, PNG, WebP or AVIF"));
    }

    #[test]
    fn unreadable_file_gets_its_own_lines() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let lines = format_unreadable(Path::new("in/gone.png"), &err);
        assert_eq!(lines, vec!["gone.png", "    unreadable: missing"]);
    }

    #[test]
    fn check_continues_past_unreadable_path() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("me.jpg");
        std::fs::write(&good, vec![0u8; 2048]).unwrap();
        let paths = vec![tmp.path().join("gone.png"), good];

        let lines = format_check_paths(&paths);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "gone.png");
        assert!(lines[1].starts_with("    unreadable: "));
        assert_eq!(lines[2], "me.jpg (image/jpeg, 2.0 KB)");
        assert_eq!(lines[3], "    accepted");
    }

    #[test]
    fn outcome_lines() {
        let mut form = FormBinder::new(&FormConfig::default());
        form.commit_file(&CropResult {
            bytes: vec![0; 100],
            mime: OUTPUT_MIME,
            width: 2048,
            height: 2048,
        });
        let outcome = FileOutcome {
            source: PathBuf::from("in/me.png"),
            file: form.file().cloned().unwrap(),
            submission: form.submission(),
        };
        let lines = format_outcome(&outcome, Some(Path::new("out/me.jpg")));
        assert_eq!(
            lines,
            vec![
                "me.png → out/me.jpg",
                "    profile.jpg: image/jpeg, 100 B",
                "    form: image=profile.jpg delete_image=false",
            ]
        );
    }

    #[test]
    fn failure_lines() {
        let err = IntakeFileError::Rejected("nope".into());
        let lines = format_failure(Path::new("x/anim.gif"), &err);
        assert_eq!(lines, vec!["anim.gif", "    failed: nope"]);
    }

    #[test]
    fn batch_summary_counts() {
        let results = vec![
            (PathBuf::from("a.png"), Ok(PathBuf::from("out/a.jpg"))),
            (PathBuf::from("b.gif"), Err("unsupported".to_string())),
        ];
        let lines = format_batch(&results);
        assert_eq!(lines[0], "a.png → out/a.jpg");
        assert_eq!(lines[1], "b.gif");
        assert_eq!(lines[2], "    failed: unsupported");
        assert_eq!(lines.last().unwrap(), "1 committed, 1 failed");
    }
}
