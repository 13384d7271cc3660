//! Diagnostics for the most recent fit.
//!
//! A [`StatsRecorder`] holds exactly one [`FitStats`] record, overwritten by every fit call that
//! uses it. Fits running concurrently each need their own recorder; the engine takes it by
//! `&mut`, so sharing one between threads requires external serialization.

use std::time::{Duration, Instant};

use crate::crop::Rect;

/// Which branch of the fit decision produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitPath {
    /// Source returned untouched.
    Identity,
    /// Uniform resize of the whole source.
    Scale,
    /// Crop followed by resize.
    Crop,
    /// Call failed; no output.
    #[default]
    Rejected,
}

/// Diagnostic record of one fit call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitStats {
    /// Whether the crop was anchored on a detected face.
    pub found: bool,
    /// Quality score of the anchoring face, `0.0` when none.
    pub quality: f64,
    /// Horizontal scale factor from the sampled source region to the output; `0.0` when rejected.
    pub scale: f64,
    /// Crop rectangle in source coordinates, `None` unless the crop path ran.
    pub rect: Option<Rect>,
    /// Wall time of the whole call.
    pub duration: Duration,
    /// Branch that produced the result.
    pub path: FitPath,
}

impl FitStats {
    pub(crate) fn rejected(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

/// Single-slot store for the latest [`FitStats`].
#[derive(Debug, Default)]
pub struct StatsRecorder {
    last: Option<FitStats>,
}

impl StatsRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a fit call.
    pub(crate) fn start(&self) -> FitTimer {
        FitTimer {
            start: Instant::now(),
        }
    }

    /// Replace the stored record.
    pub(crate) fn record(&mut self, stats: FitStats) {
        log::debug!(
            target: "wallfit::stats",
            "{:?}: found={} quality={:.2} scale={:.4} rect={:?} in {:.2?}",
            stats.path,
            stats.found,
            stats.quality,
            stats.scale,
            stats.rect,
            stats.duration
        );
        self.last = Some(stats);
    }

    /// Record of the most recent fit, if any fit has run.
    pub fn last(&self) -> Option<&FitStats> {
        self.last.as_ref()
    }

    /// Remove and return the most recent record.
    pub fn take(&mut self) -> Option<FitStats> {
        self.last.take()
    }
}

/// Elapsed-time probe started at the top of a fit call.
pub(crate) struct FitTimer {
    start: Instant,
}

impl FitTimer {
    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
