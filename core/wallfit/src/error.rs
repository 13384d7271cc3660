use thiserror::Error;

/// Why a fit produced no wallpaper.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// The source image has a zero width or height.
    #[error("source image {width}x{height} has a zero dimension")]
    InvalidImage {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },

    /// The display resolution has a zero width or height.
    #[error("target dimension {width}x{height} has a zero dimension")]
    InvalidTarget {
        /// Target width in pixels.
        width: u32,
        /// Target height in pixels.
        height: u32,
    },

    /// The source is smaller than the display and the mode forbids upscaling.
    #[error(
        "source {source_width}x{source_height} is smaller than target {target_width}x{target_height}"
    )]
    IncompatibleResolution {
        /// Source width in pixels.
        source_width: u32,
        /// Source height in pixels.
        source_height: u32,
        /// Target width in pixels.
        target_width: u32,
        /// Target height in pixels.
        target_height: u32,
    },

    /// The aspect ratios differ by more than the mode's crop tolerance.
    #[error("aspect ratio difference {aspect_diff:.4} exceeds the crop bound {limit:.4}")]
    IncompatibleAspect {
        /// Absolute aspect ratio difference.
        aspect_diff: f64,
        /// Crop tolerance of the active mode.
        limit: f64,
    },

    /// A configuration value is out of range.
    #[error("invalid fit configuration: {0}")]
    InvalidConfig(String),

    /// A face model could not be parsed.
    #[error("failed to load face model: {0}")]
    ModelLoad(String),
}
