use std::cmp::Ordering;
use std::sync::Arc;

use image::DynamicImage;

use crate::config::FitConfig;
use crate::crop::Rect;
use crate::error::FitError;
use crate::resample;

/// Longest side of the grayscale copy handed to the detector backend.
pub const DETECTION_MAX_DIMENSION: u32 = 1024;

/// Raw bounding box reported by a detector backend, in the coordinates of the buffer it was given.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

/// Pluggable face detection backend.
///
/// The model behind an implementation is loaded once and shared read-only; implementations must
/// tolerate concurrent `detect` calls from several fitting threads.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}

/// A detected face that passed the confidence and size filters, in source image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCandidate {
    /// Face bounding box, clipped to the image.
    pub rect: Rect,
    /// Detector score.
    pub quality: f64,
    /// Detection window size in source pixels.
    pub scale: u32,
}

/// Face detection capability injected into the engine.
#[derive(Clone, Default)]
pub enum FaceDetection {
    /// No model; detection returns nothing at no cost.
    #[default]
    Disabled,
    /// A loaded model shared between engines and threads.
    Loaded(Arc<dyn FaceDetector>),
}

impl std::fmt::Debug for FaceDetection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaceDetection::Disabled => f.write_str("FaceDetection::Disabled"),
            FaceDetection::Loaded(_) => f.write_str("FaceDetection::Loaded(..)"),
        }
    }
}

impl FaceDetection {
    /// Wrap a freshly loaded detector.
    pub fn new(detector: impl FaceDetector + 'static) -> Self {
        FaceDetection::Loaded(Arc::new(detector))
    }

    /// Use a detector already shared with other engines.
    pub fn shared(detector: Arc<dyn FaceDetector>) -> Self {
        FaceDetection::Loaded(detector)
    }

    /// Run a model loader, falling back to [`FaceDetection::Disabled`] if it fails.
    ///
    /// A missing or broken model only turns face features off; it is never fatal to fitting.
    pub fn from_loader<D, F>(load: F) -> Self
    where
        D: FaceDetector + 'static,
        F: FnOnce() -> Result<D, FitError>,
    {
        match load() {
            Ok(detector) => Self::new(detector),
            Err(e) => {
                log::warn!(target: "wallfit::face", "face detection disabled: {e}");
                FaceDetection::Disabled
            }
        }
    }

    /// Whether a model is loaded.
    pub fn is_enabled(&self) -> bool {
        matches!(self, FaceDetection::Loaded(_))
    }

    /// Detect faces in `image`, keeping only those that pass `config`'s filters.
    ///
    /// Results are sorted by descending quality, ties broken by larger area.
    pub fn detect(&self, image: &DynamicImage, config: &FitConfig) -> Vec<FaceCandidate> {
        let FaceDetection::Loaded(detector) = self else {
            return Vec::new();
        };

        let (img_w, img_h) = (image.width(), image.height());
        if img_w == 0 || img_h == 0 {
            return Vec::new();
        }

        let gray = resample::luma_within(image, DETECTION_MAX_DIMENSION);
        let (det_w, det_h) = gray.dimensions();

        let raw = detector.detect(gray.as_raw(), det_w, det_h);
        let candidates = filter_candidates(
            &raw,
            img_w as f64 / det_w as f64,
            img_h as f64 / det_h as f64,
            img_w,
            img_h,
            config,
        );
        log::debug!(
            target: "wallfit::face",
            "{} raw detection(s), {} kept on {}x{} (detector input {}x{})",
            raw.len(),
            candidates.len(),
            img_w,
            img_h,
            det_w,
            det_h
        );
        candidates
    }
}

/// Map raw detections into source coordinates and apply the confidence and size filters.
pub(crate) fn filter_candidates(
    raw: &[FaceBounds],
    scale_x: f64,
    scale_y: f64,
    image_width: u32,
    image_height: u32,
    config: &FitConfig,
) -> Vec<FaceCandidate> {
    let image_area = image_width as f64 * image_height as f64;

    let mut kept: Vec<FaceCandidate> = raw
        .iter()
        // NaN scores never compare >=, so they are dropped here too
        .filter(|face| face.confidence >= config.min_confidence)
        .filter_map(|face| {
            let rect = Rect::from_bounds_clipped(
                face.x * scale_x,
                face.y * scale_y,
                face.width * scale_x,
                face.height * scale_y,
                image_width,
                image_height,
            )?;
            let area_pct = rect.area() as f64 / image_area * 100.0;
            if area_pct < config.min_face_size_pct {
                return None;
            }
            let window = (face.width * scale_x).max(face.height * scale_y);
            let scale = window.round().max(1.0) as u32;
            Some(FaceCandidate {
                rect,
                quality: face.confidence,
                scale,
            })
        })
        .collect();

    kept.sort_by(|a, b| match b.quality.total_cmp(&a.quality) {
        Ordering::Equal => b.rect.area().cmp(&a.rect.area()),
        other => other,
    });
    kept
}
