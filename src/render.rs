//! Markup for the field, rendered from a [`FieldView`] with Maud.
//!
//! Region visibility is expressed with the `hidden` attribute straight from
//! [`Visibility`](crate::preview::Visibility), never toggled ad hoc. The crop
//! modal is only present in the markup while a session is open.

use crate::field::{CropView, FieldView};
use crate::validate::ALLOWED_TYPES;
use maud::{DOCTYPE, Markup, html};

/// Renders the field fragment: drop zone, existing image, live preview, modal
/// and the two form inputs.
pub fn render_field(view: &FieldView) -> Markup {
    let vis = view.visibility;
    let sub = &view.submission;
    html! {
        div.profile-photo-field data-state=(view.state.to_string()) {
            div.drop-zone.active[view.drop_active] hidden[!vis.drop_zone] {
                p { "Drop a photo here, or click to choose one" }
                small { "JPEG, PNG, WebP or AVIF, up to 5 MB" }
            }
            input.file-input type="file" name=(sub.file_field)
                accept=(ALLOWED_TYPES.join(",")) hidden;
            input type="checkbox" name=(sub.delete_field) value="on" checked[sub.delete] hidden;

            div.existing-image hidden[!vis.existing] {
                @if let Some(url) = &view.existing_url {
                    img src=(url) alt="Current profile photo";
                }
                (photo_actions())
            }
            div.live-preview hidden[!vis.preview] {
                img src=[view.preview_src.as_deref()] alt="New profile photo";
                (photo_actions())
            }
            @if let Some(crop) = &view.crop {
                (crop_modal(crop))
            }
        }
    }
}

fn photo_actions() -> Markup {
    html! {
        div.photo-actions {
            button.replace type="button" { i.icon data-icon="refresh" {} "Replace" }
            button.delete type="button" { i.icon data-icon="trash" {} "Delete" }
        }
    }
}

fn crop_modal(crop: &CropView) -> Markup {
    let r = crop.region;
    // Percentages keep the box aligned however the image is scaled on screen.
    let pct = |v: u32, of: u32| v as f64 * 100.0 / of.max(1) as f64;
    let box_style = format!(
        "left:{:.3}%;top:{:.3}%;width:{:.3}%;height:{:.3}%;",
        pct(r.x, crop.image_width),
        pct(r.y, crop.image_height),
        pct(r.width, crop.image_width),
        pct(r.height, crop.image_height),
    );
    html! {
        div.crop-modal role="dialog" aria-modal="true" aria-label="Crop photo" {
            div.crop-stage data-width=(crop.image_width) data-height=(crop.image_height) {
                div.crop-box style=(box_style)
                    data-x=(r.x) data-y=(r.y) data-size=(r.width) {}
            }
            div.crop-actions {
                button.crop-cancel type="button" { i.icon data-icon="x" {} "Cancel" }
                button.crop-confirm type="button" disabled[crop.encoding] {
                    i.icon data-icon="check" {}
                    @if crop.encoding { "Saving…" } @else { "Use photo" }
                }
            }
        }
    }
}

/// A standalone HTML page around the field, for the CLI `render` command.
pub fn render_page(title: &str, view: &FieldView) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                form method="post" enctype="multipart/form-data" {
                    (render_field(view))
                    button type="submit" { "Save" }
                }
            }
        }
    }
}
