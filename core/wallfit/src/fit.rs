use std::borrow::Cow;

use image::{DynamicImage, GenericImageView};

use crate::anchor;
use crate::config::FitConfig;
use crate::crop::aspect_fit;
use crate::error::FitError;
use crate::face_detector::FaceDetection;
use crate::resample;
use crate::stats::{FitPath, FitStats, StatsRecorder};
use crate::TargetDimension;

/// Rendering branch picked by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Branch {
    Identity,
    Scale,
    Crop,
}

impl Branch {
    fn path(self) -> FitPath {
        match self {
            Branch::Identity => FitPath::Identity,
            Branch::Scale => FitPath::Scale,
            Branch::Crop => FitPath::Crop,
        }
    }
}

/// Classify a (source, target) pair into the branch that will render it.
///
/// With smart fit enabled the aspect difference is checked against the mode's identity, scale and
/// crop bands in turn, and anything beyond the crop band is rejected. With smart fit disabled,
/// every mismatch beyond the scale band becomes a plain crop.
pub(crate) fn classify(
    source_width: u32,
    source_height: u32,
    target: TargetDimension,
    config: &FitConfig,
) -> Result<Branch, FitError> {
    let thresholds = config.thresholds();
    let source_aspect = source_width as f64 / source_height as f64;
    let aspect_diff = (source_aspect - target.aspect()).abs();
    let same_size = source_width == target.width && source_height == target.height;

    if same_size && aspect_diff <= thresholds.identity_tolerance {
        return Ok(Branch::Identity);
    }
    if aspect_diff <= thresholds.scale_tolerance {
        return Ok(Branch::Scale);
    }
    if !config.smart_fit_enabled || aspect_diff <= thresholds.crop_tolerance {
        return Ok(Branch::Crop);
    }
    Err(FitError::IncompatibleAspect {
        aspect_diff,
        limit: thresholds.crop_tolerance,
    })
}

fn check_inputs(
    source_width: u32,
    source_height: u32,
    target: TargetDimension,
    config: &FitConfig,
) -> Result<(), FitError> {
    config.validate()?;
    if source_width == 0 || source_height == 0 {
        return Err(FitError::InvalidImage {
            width: source_width,
            height: source_height,
        });
    }
    if target.width == 0 || target.height == 0 {
        return Err(FitError::InvalidTarget {
            width: target.width,
            height: target.height,
        });
    }
    let undersized = source_width < target.width || source_height < target.height;
    if undersized && !config.fit_mode.allows_upscale() {
        return Err(FitError::IncompatibleResolution {
            source_width,
            source_height,
            target_width: target.width,
            target_height: target.height,
        });
    }
    Ok(())
}

/// Decide and render; stats come back without a duration.
fn render<'a>(
    source: &'a DynamicImage,
    target: TargetDimension,
    config: &FitConfig,
    detection: &FaceDetection,
) -> Result<(Cow<'a, DynamicImage>, FitStats), FitError> {
    let (src_w, src_h) = source.dimensions();
    check_inputs(src_w, src_h, target, config)?;
    let branch = classify(src_w, src_h, target, config)?;
    log::debug!(
        target: "wallfit::fit",
        "{src_w}x{src_h} -> {}x{} ({} mode): {branch:?}",
        target.width,
        target.height,
        config.fit_mode
    );
    let path = branch.path();

    match branch {
        Branch::Identity => Ok((
            Cow::Borrowed(source),
            FitStats {
                scale: 1.0,
                path,
                ..FitStats::default()
            },
        )),
        Branch::Scale => {
            let image = resample::resize(
                source,
                None,
                target.width,
                target.height,
                config.resize_quality,
            );
            Ok((
                Cow::Owned(image),
                FitStats {
                    scale: target.width as f64 / src_w as f64,
                    path,
                    ..FitStats::default()
                },
            ))
        }
        Branch::Crop => {
            let anchor = if config.smart_fit_enabled {
                let faces = if config.face_crop_enabled {
                    detection.detect(source, config)
                } else {
                    Vec::new()
                };
                anchor::resolve(source, target, &faces, config)
            } else {
                anchor::Anchor {
                    rect: aspect_fit(src_w, src_h, target.width, target.height),
                    face: None,
                }
            };

            let image = resample::resize(
                source,
                Some(anchor.rect),
                target.width,
                target.height,
                config.resize_quality,
            );
            Ok((
                Cow::Owned(image),
                FitStats {
                    found: anchor.face.is_some(),
                    quality: anchor.face.as_ref().map_or(0.0, |face| face.quality),
                    scale: target.width as f64 / anchor.rect.width as f64,
                    rect: Some(anchor.rect),
                    path,
                    ..FitStats::default()
                },
            ))
        }
    }
}

/// Full fit: validate → classify → (detect → anchor) → resample → record stats.
///
/// Exactly one record is written to `recorder`, whatever the outcome.
pub(crate) fn fit_pipeline<'a>(
    source: &'a DynamicImage,
    target: TargetDimension,
    config: &FitConfig,
    detection: &FaceDetection,
    recorder: &mut StatsRecorder,
) -> Result<Cow<'a, DynamicImage>, FitError> {
    let timer = recorder.start();
    match render(source, target, config, detection) {
        Ok((image, mut stats)) => {
            stats.duration = timer.elapsed();
            recorder.record(stats);
            Ok(image)
        }
        Err(e) => {
            log::debug!(target: "wallfit::fit", "fit rejected: {e}");
            recorder.record(FitStats::rejected(timer.elapsed()));
            Err(e)
        }
    }
}
