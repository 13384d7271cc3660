use std::io::Cursor;

use crate::error::FitError;
use crate::face_detector::{FaceBounds, FaceDetector};

/// Search parameters for the SeetaFace cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RustfaceSettings {
    /// Smallest face edge, in detector-input pixels.
    pub min_face_size: u32,
    /// Cascade score threshold. Kept permissive; `FitConfig::min_confidence` filters later.
    pub score_thresh: f64,
    /// Scale factor between image pyramid levels, in `(0, 1)`.
    pub pyramid_scale_factor: f32,
    /// Sliding window step, in pixels, along each axis.
    pub slide_window_step: (u32, u32),
}

impl Default for RustfaceSettings {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is parsed once from caller-supplied bytes; each `detect` call builds a detector over a
/// clone of it, so one instance can serve several fitting threads.
pub struct RustfaceDetector {
    model: rustface::Model,
    settings: RustfaceSettings,
}

impl RustfaceDetector {
    /// Parse a SeetaFace frontal model (`seeta_fd_frontal_v1.0.bin`).
    pub fn from_bytes(model_data: &[u8]) -> Result<Self, FitError> {
        let model = rustface::read_model(Cursor::new(model_data))
            .map_err(|e| FitError::ModelLoad(e.to_string()))?;
        Ok(Self {
            model,
            settings: RustfaceSettings::default(),
        })
    }

    /// Smallest face edge, in detector-input pixels, the engine searches for (default: 20).
    pub fn min_face_size(mut self, size: u32) -> Self {
        self.settings.min_face_size = size;
        self
    }

    /// Replace every search parameter at once.
    pub fn with_settings(mut self, settings: RustfaceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Search parameters in use.
    pub fn settings(&self) -> &RustfaceSettings {
        &self.settings
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let settings = &self.settings;
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(settings.min_face_size);
        detector.set_score_thresh(settings.score_thresh);
        detector.set_pyramid_scale_factor(settings.pyramid_scale_factor);
        let (step_x, step_y) = settings.slide_window_step;
        detector.set_slide_window_step(step_x, step_y);

        detector
            .detect(&rustface::ImageData::new(gray, width, height))
            .into_iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
