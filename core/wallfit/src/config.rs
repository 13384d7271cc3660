//! Fit configuration snapshot.
//!
//! A [`FitConfig`] is supplied by the caller's preference store on every call and is never
//! mutated by the engine. All fields have defaults, so a partial serialized snapshot loads with
//! `#[serde(default)]` filling the gaps.

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Threshold strictness used by the fit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Rejects sources smaller than the display and tolerates only moderate aspect mismatch.
    #[default]
    Normal,
    /// Accepts upscaling and much larger aspect mismatch.
    Aggressive,
}

impl FitMode {
    /// Every mode, in table order.
    pub const ALL: [FitMode; 2] = [FitMode::Normal, FitMode::Aggressive];

    fn index(self) -> usize {
        match self {
            FitMode::Normal => 0,
            FitMode::Aggressive => 1,
        }
    }

    /// Whether sources smaller than the target may be upscaled.
    pub fn allows_upscale(self) -> bool {
        matches!(self, FitMode::Aggressive)
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitMode::Normal => "normal",
            FitMode::Aggressive => "aggressive",
        })
    }
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(FitMode::Normal),
            "aggressive" => Ok(FitMode::Aggressive),
            other => Err(format!(
                "invalid fit mode '{other}'; expected 'normal' or 'aggressive'"
            )),
        }
    }
}

/// Aspect-difference bands for one [`FitMode`].
///
/// `identity_tolerance <= scale_tolerance <= crop_tolerance`; differences are measured as
/// `|source_w / source_h - target_w / target_h|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeThresholds {
    /// Source is returned untouched when sizes match and the difference is at most this.
    pub identity_tolerance: f64,
    /// Uniform scale without cropping up to this difference.
    pub scale_tolerance: f64,
    /// Crop path up to this difference; beyond it the pair is rejected.
    pub crop_tolerance: f64,
}

/// Per-mode thresholds, indexed by [`FitMode`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceTable([ModeThresholds; 2]);

impl ToleranceTable {
    /// Built-in bands for both modes.
    pub const DEFAULT: ToleranceTable = ToleranceTable([
        // Normal
        ModeThresholds {
            identity_tolerance: 0.001,
            scale_tolerance: 0.01,
            crop_tolerance: 0.5,
        },
        // Aggressive
        ModeThresholds {
            identity_tolerance: 0.001,
            scale_tolerance: 0.05,
            crop_tolerance: 1.5,
        },
    ]);

    /// Table with explicit bands for each mode.
    pub fn new(normal: ModeThresholds, aggressive: ModeThresholds) -> Self {
        Self([normal, aggressive])
    }

    /// Bands for `mode`.
    pub fn get(&self, mode: FitMode) -> &ModeThresholds {
        &self.0[mode.index()]
    }

    /// Replace the bands for `mode`.
    pub fn set(&mut self, mode: FitMode, thresholds: ModeThresholds) {
        self.0[mode.index()] = thresholds;
    }
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resampling kernel used by the resizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeQuality {
    /// Nearest neighbour.
    Fast,
    /// Bilinear (Triangle).
    Balanced,
    /// Lanczos3 (default).
    #[default]
    Best,
}

impl ResizeQuality {
    /// Resampling filter for this quality level.
    pub fn filter(self) -> FilterType {
        match self {
            ResizeQuality::Fast => FilterType::Nearest,
            ResizeQuality::Balanced => FilterType::Triangle,
            ResizeQuality::Best => FilterType::Lanczos3,
        }
    }
}

/// Default minimum face detection quality.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 5.0;

/// Default minimum face area, in percent of the image area.
pub const DEFAULT_MIN_FACE_SIZE_PCT: f64 = 0.5;

/// Default upward shift of the crop center, as a fraction of the crop height.
pub const DEFAULT_VERTICAL_SHIFT_BIAS: f64 = 0.1;

/// Default padding kept around a face, as a fraction of the face size.
pub const DEFAULT_FACE_MARGIN: f64 = 0.25;

/// Read-only fit preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// When disabled, mismatched aspects get a plain centered crop with no face or saliency work.
    pub smart_fit_enabled: bool,
    /// Threshold strictness.
    pub fit_mode: FitMode,
    /// Anchor crops on detected faces when a detector is available.
    pub face_crop_enabled: bool,
    /// Widen the safety margin kept around the face.
    pub face_boost_enabled: bool,
    /// Strength of the face boost; the margin grows by `strength * 0.25` of its base value.
    pub face_boost_strength: f64,
    /// Faces smaller than this percentage of the image area are discarded.
    pub min_face_size_pct: f64,
    /// Faces with a detector score below this are discarded.
    pub min_confidence: f64,
    /// Upward shift of the crop center as a fraction of the crop height. Negative moves down.
    pub vertical_shift_bias: f64,
    /// Base padding around the face as a fraction of the face box size.
    pub face_margin: f64,
    /// Kernel used when resizing to the target.
    pub resize_quality: ResizeQuality,
    /// Aspect bands per mode.
    pub tolerances: ToleranceTable,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            smart_fit_enabled: true,
            fit_mode: FitMode::Normal,
            face_crop_enabled: true,
            face_boost_enabled: false,
            face_boost_strength: 1.0,
            min_face_size_pct: DEFAULT_MIN_FACE_SIZE_PCT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            vertical_shift_bias: DEFAULT_VERTICAL_SHIFT_BIAS,
            face_margin: DEFAULT_FACE_MARGIN,
            resize_quality: ResizeQuality::default(),
            tolerances: ToleranceTable::default(),
        }
    }
}

impl FitConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable aspect-aware fitting.
    pub fn smart_fit(mut self, enable: bool) -> Self {
        self.smart_fit_enabled = enable;
        self
    }

    /// Set the fit mode.
    pub fn mode(mut self, mode: FitMode) -> Self {
        self.fit_mode = mode;
        self
    }

    /// Enable or disable face-anchored crops.
    pub fn face_crop(mut self, enable: bool) -> Self {
        self.face_crop_enabled = enable;
        self
    }

    /// Enable the face boost with the given strength.
    pub fn face_boost(mut self, strength: f64) -> Self {
        self.face_boost_enabled = true;
        self.face_boost_strength = strength;
        self
    }

    /// Minimum face area in percent of the image (default: 0.5).
    pub fn min_face_size_pct(mut self, pct: f64) -> Self {
        self.min_face_size_pct = pct;
        self
    }

    /// Minimum detector score (default: 5.0).
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Upward shift of the crop center, in crop heights (default: 0.1).
    pub fn vertical_shift_bias(mut self, bias: f64) -> Self {
        self.vertical_shift_bias = bias;
        self
    }

    /// Padding around the face, in face sizes (default: 0.25).
    pub fn face_margin(mut self, margin: f64) -> Self {
        self.face_margin = margin;
        self
    }

    /// Set the resampling quality.
    pub fn resize_quality(mut self, quality: ResizeQuality) -> Self {
        self.resize_quality = quality;
        self
    }

    /// Replace the per-mode tolerance table.
    pub fn tolerances(mut self, table: ToleranceTable) -> Self {
        self.tolerances = table;
        self
    }

    /// Thresholds for the configured mode.
    pub fn thresholds(&self) -> &ModeThresholds {
        self.tolerances.get(self.fit_mode)
    }

    /// Padding fraction around a face, widened by the face boost when enabled.
    pub fn effective_face_margin(&self) -> f64 {
        if self.face_boost_enabled {
            self.face_margin * (1.0 + self.face_boost_strength * 0.25)
        } else {
            self.face_margin
        }
    }

    /// Reject values the engine cannot act on.
    pub fn validate(&self) -> Result<(), FitError> {
        let non_negative = [
            ("face_boost_strength", self.face_boost_strength),
            ("min_face_size_pct", self.min_face_size_pct),
            ("face_margin", self.face_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FitError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.min_face_size_pct > 100.0 {
            return Err(FitError::InvalidConfig(format!(
                "min_face_size_pct must be at most 100, got {}",
                self.min_face_size_pct
            )));
        }
        if !self.min_confidence.is_finite() {
            return Err(FitError::InvalidConfig(format!(
                "min_confidence must be finite, got {}",
                self.min_confidence
            )));
        }
        if !self.vertical_shift_bias.is_finite() || self.vertical_shift_bias.abs() > 0.5 {
            return Err(FitError::InvalidConfig(format!(
                "vertical_shift_bias must be within [-0.5, 0.5], got {}",
                self.vertical_shift_bias
            )));
        }
        for mode in FitMode::ALL {
            let t = self.tolerances.get(mode);
            let ordered = 0.0 <= t.identity_tolerance
                && t.identity_tolerance <= t.scale_tolerance
                && t.scale_tolerance <= t.crop_tolerance;
            if !ordered || !t.crop_tolerance.is_finite() {
                return Err(FitError::InvalidConfig(format!(
                    "{mode} tolerances must satisfy 0 <= identity <= scale <= crop, got {t:?}"
                )));
            }
        }
        Ok(())
    }
}
