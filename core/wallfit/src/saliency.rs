//! Saliency-based crop search.
//!
//! When no face anchors the crop, the analyzer scores target-aspect windows by the density of
//! Sobel gradient energy in a down-sampled grayscale copy of the source and keeps the densest.
//! Window positions come from a bounded grid over the free axis, so the cost depends on the
//! analysis resolution rather than the source resolution. Equal scores resolve toward the
//! centered window, then toward the smaller offset, which keeps the result fully deterministic.

use image::{DynamicImage, GenericImageView};
use imageproc::gradients::sobel_gradients;

use crate::crop::{aspect_fit, Rect};
use crate::resample;

/// Longest side of the analysis copy.
pub const ANALYSIS_MAX_DIMENSION: u32 = 256;

/// Upper bound on candidate offsets per axis.
pub const MAX_GRID_POSITIONS: u32 = 33;

/// Summed-area table of gradient magnitudes over the analysis copy.
struct EnergyMap {
    width: u32,
    height: u32,
    /// `(width + 1) * (height + 1)` prefix sums.
    table: Vec<u64>,
}

impl EnergyMap {
    fn build(image: &DynamicImage) -> Self {
        let gray = resample::luma_within(image, ANALYSIS_MAX_DIMENSION);
        let gradients = sobel_gradients(&gray);
        let (width, height) = gradients.dimensions();
        let stride = width as usize + 1;
        let mut table = vec![0u64; stride * (height as usize + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += gradients.get_pixel(x, y)[0] as u64;
                let idx = (y as usize + 1) * stride + x as usize + 1;
                table[idx] = table[idx - stride] + row_sum;
            }
        }

        Self {
            width,
            height,
            table,
        }
    }

    /// Sum over the half-open analysis window `[x0, x1) × [y0, y1)`.
    fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let stride = self.width as usize + 1;
        let at = |x: u32, y: u32| self.table[y as usize * stride + x as usize];
        at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1)
    }

    /// Mean gradient energy of a source-space rectangle.
    fn density(&self, rect: &Rect, source_width: u32, source_height: u32) -> f64 {
        let sx = self.width as f64 / source_width as f64;
        let sy = self.height as f64 / source_height as f64;
        let x0 = ((rect.x as f64 * sx).floor() as u32).min(self.width.saturating_sub(1));
        let y0 = ((rect.y as f64 * sy).floor() as u32).min(self.height.saturating_sub(1));
        let x1 = ((rect.right() as f64 * sx).ceil() as u32).clamp(x0 + 1, self.width);
        let y1 = ((rect.bottom() as f64 * sy).ceil() as u32).clamp(y0 + 1, self.height);
        let area = (x1 - x0) as f64 * (y1 - y0) as f64;
        self.sum(x0, y0, x1, y1) as f64 / area
    }
}

/// Evenly spaced offsets in `0..=slack`, always including both ends and `center`.
fn grid_offsets(slack: u32, center: u32) -> Vec<u32> {
    if slack == 0 {
        return vec![0];
    }
    let steps = slack.min(MAX_GRID_POSITIONS - 1) as u64;
    let mut offsets: Vec<u32> = (0..=steps)
        .map(|i| ((i * slack as u64 + steps / 2) / steps) as u32)
        .collect();
    offsets.push(center.min(slack));
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

/// Find the most visually interesting rectangle with the target aspect ratio.
///
/// The rectangle is as large as the source allows, so only its position is searched.
pub fn find_best_crop(image: &DynamicImage, target_width: u32, target_height: u32) -> Rect {
    let (src_w, src_h) = image.dimensions();
    let centered = aspect_fit(src_w, src_h, target_width, target_height);
    let slack_x = src_w - centered.width;
    let slack_y = src_h - centered.height;
    if slack_x == 0 && slack_y == 0 {
        return centered;
    }

    let energy = EnergyMap::build(image);
    let mut best = centered;
    let mut best_score = f64::NEG_INFINITY;
    let mut best_distance = u32::MAX;

    let xs = grid_offsets(slack_x, centered.x);
    for y in grid_offsets(slack_y, centered.y) {
        for &x in &xs {
            let candidate = Rect { x, y, ..centered };
            let score = energy.density(&candidate, src_w, src_h);
            let distance = x.abs_diff(centered.x) + y.abs_diff(centered.y);
            log::trace!(
                target: "wallfit::saliency",
                "candidate ({x}, {y}) score {score:.3}"
            );
            if score > best_score || (score == best_score && distance < best_distance) {
                best = candidate;
                best_score = score;
                best_distance = distance;
            }
        }
    }

    log::debug!(
        target: "wallfit::saliency",
        "best crop {:?} (score {:.3}) on {}x{} via {}x{} analysis",
        best,
        best_score,
        src_w,
        src_h,
        energy.width,
        energy.height
    );
    best
}
