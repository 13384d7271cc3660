//! Smart wallpaper fitting: turn any decoded image into a pixel-exact wallpaper for a display.
//!
//! The engine compares source and display aspect ratios, then returns the source untouched,
//! scales it uniformly, or crops a display-shaped region and scales that. Crops are anchored on
//! the best detected face when a face model is available, and on the most detailed region of the
//! image otherwise.
//!
//! # Example
//!
//! ```no_run
//! use wallfit::{FitConfig, FitEngine, FitMode, TargetDimension};
//!
//! let source = image::open("wallpaper.jpg").unwrap();
//! let engine = FitEngine::new();
//! let config = FitConfig::default().mode(FitMode::Aggressive);
//!
//! let fitted = engine
//!     .fit(&source, TargetDimension::new(1920, 1080), &config)
//!     .unwrap();
//! assert_eq!(fitted.image.width(), 1920);
//! println!("crop: {:?}, face: {}", fitted.stats.rect, fitted.stats.found);
//! ```
#![warn(missing_docs)]

mod anchor;
/// Fit preferences and per-mode thresholds.
pub mod config;
/// Rectangle geometry used for crop regions.
pub mod crop;
mod error;
/// Face detection traits, candidates, and the injectable capability.
pub mod face_detector;
mod fit;
/// Crop extraction and resizing.
pub mod resample;
#[cfg(feature = "rustface")]
/// SeetaFace-based face detector backend.
pub mod rustface_backend;
/// Saliency-based crop search.
pub mod saliency;
/// Per-call diagnostics.
pub mod stats;

use std::borrow::Cow;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

pub use anchor::{resolve as resolve_anchor, Anchor};
pub use config::{FitConfig, FitMode, ModeThresholds, ResizeQuality, ToleranceTable};
pub use crop::Rect;
/// Error type returned by fit operations.
pub use error::FitError;
pub use face_detector::{FaceBounds, FaceCandidate, FaceDetection, FaceDetector};
#[cfg(feature = "rustface")]
pub use rustface_backend::{RustfaceDetector, RustfaceSettings};
pub use stats::{FitPath, FitStats, StatsRecorder};

/// Output resolution of one display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetDimension {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TargetDimension {
    /// Create a target of `width` × `height` pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width / height.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Result of a successful [`FitEngine::fit`].
#[derive(Debug, Clone)]
pub struct FitOutput<'a> {
    /// Wallpaper at exactly the target size. Borrowed when the source already matched.
    pub image: Cow<'a, DynamicImage>,

    /// Diagnostics for this call.
    pub stats: FitStats,
}

/// Outcome of fitting one source to one display in [`FitEngine::fit_displays`].
#[derive(Debug)]
pub struct DisplayFit<'a> {
    /// The display the source was fitted to.
    pub target: TargetDimension,

    /// The wallpaper, or why this display was skipped.
    pub result: Result<Cow<'a, DynamicImage>, FitError>,

    /// Diagnostics for this display's call.
    pub stats: FitStats,
}

/// Fits images to display resolutions.
///
/// An engine holds only the face detection capability, which is shared read-only, so a single
/// engine can serve many threads. Stats are kept per call: pass each concurrent call its own
/// [`StatsRecorder`].
#[derive(Debug, Clone, Default)]
pub struct FitEngine {
    detection: FaceDetection,
}

impl FitEngine {
    /// Create an engine without face detection; crops fall back to saliency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given detection capability.
    pub fn with_detection(detection: FaceDetection) -> Self {
        Self { detection }
    }

    /// Provide a face detector implementation.
    ///
    /// ```no_run
    /// use wallfit::{FaceBounds, FaceDetector, FitEngine};
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
    ///         // Your detection logic here
    ///         vec![]
    ///     }
    /// }
    ///
    /// let engine = FitEngine::new().face_detector(MyDetector);
    /// ```
    pub fn face_detector(mut self, detector: impl FaceDetector + 'static) -> Self {
        self.detection = FaceDetection::new(detector);
        self
    }

    /// The detection capability in use.
    pub fn detection(&self) -> &FaceDetection {
        &self.detection
    }

    /// Fit `source` to `target`, returning the wallpaper and its stats.
    pub fn fit<'a>(
        &self,
        source: &'a DynamicImage,
        target: TargetDimension,
        config: &FitConfig,
    ) -> Result<FitOutput<'a>, FitError> {
        let mut recorder = StatsRecorder::new();
        let image = self.fit_with_recorder(source, target, config, &mut recorder)?;
        Ok(FitOutput {
            image,
            stats: recorder.take().unwrap_or_default(),
        })
    }

    /// Fit `source` to `target`, writing exactly one record to `recorder` whether or not the fit
    /// succeeds.
    pub fn fit_with_recorder<'a>(
        &self,
        source: &'a DynamicImage,
        target: TargetDimension,
        config: &FitConfig,
        recorder: &mut StatsRecorder,
    ) -> Result<Cow<'a, DynamicImage>, FitError> {
        fit::fit_pipeline(source, target, config, &self.detection, recorder)
    }

    /// Fit one source to every display in `targets`.
    ///
    /// Each display gets its own stats; a failure for one display does not affect the others.
    pub fn fit_displays<'a>(
        &self,
        source: &'a DynamicImage,
        targets: &[TargetDimension],
        config: &FitConfig,
    ) -> Vec<DisplayFit<'a>> {
        targets
            .iter()
            .map(|&target| {
                let mut recorder = StatsRecorder::new();
                let result = self.fit_with_recorder(source, target, config, &mut recorder);
                DisplayFit {
                    target,
                    result,
                    stats: recorder.take().unwrap_or_default(),
                }
            })
            .collect()
    }
}
