//! End-to-end behaviour of the profile photo field with the real imaging backend.
//!
//! Drives `ProfilePhotoField` the way a browser host would: gestures in,
//! effects out, jobs run by the test and handed back (sometimes late, to check
//! that stale outcomes are dropped).

use image::{ImageFormat, Rgb, RgbImage};
use profile_photo::acquisition::Gesture;
use profile_photo::config::FieldConfig;
use profile_photo::field::{Effect, ProfilePhotoField, Response};
use profile_photo::imaging::RustBackend;
use profile_photo::preview::PreviewJob;
use profile_photo::render::render_field;
use profile_photo::session::EncodeJob;
use profile_photo::types::{ImageCandidate, UploadState};
use std::io::Cursor;

fn jpeg(width: u32, height: u32) -> ImageCandidate {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    ImageCandidate::new("holiday.jpg", "image/jpeg", buf.into_inner())
}

fn field_with_existing() -> ProfilePhotoField<RustBackend> {
    ProfilePhotoField::new(
        RustBackend::new(),
        &FieldConfig::default(),
        Some("/media/avatars/42.jpg".into()),
    )
}

fn encode_job(response: Response) -> EncodeJob {
    response
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Encode(job) => Some(job),
            _ => None,
        })
        .expect("confirm should emit an encode job")
}

fn preview_job(response: Response) -> PreviewJob {
    response
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::DecodePreview(job) => Some(job),
            _ => None,
        })
        .expect("encode outcome should emit a preview job")
}

#[test]
fn delete_then_new_photo() {
    let mut field = field_with_existing();
    assert_eq!(field.state(), UploadState::Existing);

    // Delete
    field.handle(Gesture::DeleteClicked);
    let view = field.view();
    assert_eq!(view.state, UploadState::Deleted);
    assert!(view.visibility.drop_zone);
    assert!(!view.visibility.existing);
    assert!(view.submission.delete);
    assert!(view.submission.file.is_none());

    // Select a new image, confirm the crop
    let response = field.handle(Gesture::Drop(vec![jpeg(1200, 800)]));
    assert!(response.prevent_default);
    assert!(response.effects.iter().any(|e| matches!(e, Effect::IconRefresh)));
    assert!(field.view().visibility.modal);

    let job = encode_job(field.confirm_crop());
    let outcome = job.run(field.backend());
    let preview = preview_job(field.apply_encode(outcome));

    // Nothing committed until the preview decode resolves
    assert_eq!(field.state(), UploadState::Deleted);
    field.apply_preview(preview.run());

    let view = field.view();
    assert_eq!(view.state, UploadState::Pending);
    assert!(!view.submission.delete);
    let file = view.submission.file.as_ref().unwrap();
    assert_eq!(file.name, "profile.jpg");
    assert_eq!(file.mime, "image/jpeg");
    assert!(view.visibility.preview);
    assert!(!view.visibility.drop_zone);
    assert!(!view.visibility.modal);

    let bytes = field.form().file().unwrap().bytes();
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2048, 2048));

    let html = render_field(&view).into_string();
    assert!(html.contains("data:image/jpeg;base64,"));
}

#[test]
fn portrait_and_landscape_sources_normalize_to_same_size() {
    for (w, h) in [(90, 400), (640, 120)] {
        let mut field = ProfilePhotoField::new(RustBackend::new(), &FieldConfig::default(), None);
        field.handle(Gesture::FilesChosen(vec![jpeg(w, h)]));
        let response = field.confirm_crop();
        let leftover = field.settle(response.effects);
        assert!(leftover.is_empty());

        let bytes = field.form().file().unwrap().bytes();
        let decoded = image::load_from_memory(bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2048, 2048), "{w}x{h}");
    }
}

#[test]
fn late_encode_after_cancel_is_ignored() {
    let mut field = field_with_existing();
    field.handle(Gesture::FilesChosen(vec![jpeg(300, 300)]));
    let job = encode_job(field.confirm_crop());

    field.cancel_crop();
    assert!(!field.view().visibility.modal);

    let outcome = job.run(field.backend());
    assert!(outcome.result.is_ok());
    let response = field.apply_encode(outcome);
    assert!(response.effects.is_empty());

    assert_eq!(field.state(), UploadState::Existing);
    assert!(field.submission().file.is_none());
    assert!(!field.submission().delete);
}

#[test]
fn rejected_file_leaves_everything_alone() {
    let mut field = field_with_existing();
    let big = ImageCandidate::new("huge.jpg", "image/jpeg", vec![0u8; 6 * 1024 * 1024]);
    let response = field.handle(Gesture::FilesChosen(vec![big]));

    let notices: Vec<_> = response
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::Notice(n) => Some(n.message.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("5 MB"));
    assert_eq!(field.state(), UploadState::Existing);
    assert!(field.session().is_none());
}

#[test]
fn corrupt_jpeg_is_reported_in_required_mode() {
    let mut field = field_with_existing();
    let broken = ImageCandidate::new("broken.jpg", "image/jpeg", vec![0xFF, 0xD8, 0x00, 0x01]);
    let response = field.handle(Gesture::FilesChosen(vec![broken]));
    assert!(response.effects.iter().any(|e| matches!(e, Effect::Notice(_))));
    assert!(field.session().is_none());
    assert_eq!(field.state(), UploadState::Existing);
}
