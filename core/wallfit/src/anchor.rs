use std::cmp::Ordering;

use image::{DynamicImage, GenericImageView};

use crate::config::FitConfig;
use crate::crop::{aspect_fit, place_centered, Rect};
use crate::face_detector::FaceCandidate;
use crate::saliency;
use crate::TargetDimension;

/// Crop rectangle chosen for a source, with the face it was anchored on, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Crop rectangle in source coordinates.
    pub rect: Rect,
    /// Face the crop was centered on; `None` for saliency crops.
    pub face: Option<FaceCandidate>,
}

/// Highest quality candidate; equal qualities prefer the larger box.
fn best_face(faces: &[FaceCandidate]) -> Option<&FaceCandidate> {
    faces
        .iter()
        .max_by(|a, b| match a.quality.total_cmp(&b.quality) {
            Ordering::Equal => a.rect.area().cmp(&b.rect.area()),
            other => other,
        })
}

/// Target-aspect crop around `face`: centered on it, shifted up by the configured bias, then
/// translated so the margin-padded face (or at least the bare face) stays inside.
pub(crate) fn face_anchor(
    image_width: u32,
    image_height: u32,
    target: TargetDimension,
    face: &FaceCandidate,
    config: &FitConfig,
) -> Rect {
    let size = aspect_fit(image_width, image_height, target.width, target.height);
    let (cx, cy) = face.rect.center();
    let cy = cy - config.vertical_shift_bias * size.height as f64;

    let margin = config.effective_face_margin();
    let padded = face.rect.expanded(
        face.rect.width as f64 * margin,
        face.rect.height as f64 * margin,
        image_width,
        image_height,
    );

    place_centered(size.width, size.height, cx, cy, image_width, image_height)
        .shifted_to_contain(&padded)
        .shifted_to_contain(&face.rect)
        .clamp_within(image_width, image_height)
}

/// Pick the crop rectangle for `image`.
///
/// Uses the best face when face cropping is enabled and a candidate survived filtering,
/// otherwise hands the decision to the saliency analyzer.
pub fn resolve(
    image: &DynamicImage,
    target: TargetDimension,
    faces: &[FaceCandidate],
    config: &FitConfig,
) -> Anchor {
    let (img_w, img_h) = image.dimensions();

    if config.face_crop_enabled {
        if let Some(face) = best_face(faces) {
            let rect = face_anchor(img_w, img_h, target, face, config);
            log::debug!(
                target: "wallfit::anchor",
                "face anchor {:?} around {:?} (quality {:.2})",
                rect,
                face.rect,
                face.quality
            );
            return Anchor {
                rect,
                face: Some(face.clone()),
            };
        }
    }

    let rect = saliency::find_best_crop(image, target.width, target.height);
    log::debug!(target: "wallfit::anchor", "saliency anchor {rect:?}");
    Anchor { rect, face: None }
}
