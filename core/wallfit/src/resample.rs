use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

use crate::config::ResizeQuality;
use crate::crop::Rect;

/// Extract `rect` (if any) without interpolation, then resize to exactly
/// `target_width` × `target_height` with the kernel selected by `quality`.
///
/// The rectangle must already lie within the image; the caller guarantees it.
pub fn resize(
    image: &DynamicImage,
    rect: Option<Rect>,
    target_width: u32,
    target_height: u32,
    quality: ResizeQuality,
) -> DynamicImage {
    let filter = quality.filter();
    match rect {
        Some(Rect {
            x,
            y,
            width,
            height,
        }) => {
            let region = image.crop_imm(x, y, width, height);
            if region.width() == target_width && region.height() == target_height {
                return region;
            }
            region.resize_exact(target_width, target_height, filter)
        }
        None => image.resize_exact(target_width, target_height, filter),
    }
}

/// Grayscale copy of `image` whose longest side is at most `max_dimension`.
///
/// Images already within the bound are converted without resampling; larger ones are shrunk
/// with a Triangle filter, keeping each side at least one pixel.
pub(crate) fn luma_within(image: &DynamicImage, max_dimension: u32) -> GrayImage {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension {
        return gray;
    }
    let factor = max_dimension as f64 / longest as f64;
    let w = ((width as f64 * factor).round() as u32).max(1);
    let h = ((height as f64 * factor).round() as u32).max(1);
    image::imageops::resize(&gray, w, h, FilterType::Triangle)
}
