use std::borrow::Cow;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use wallfit::{
    FaceBounds, FaceDetection, FaceDetector, FitConfig, FitEngine, FitError, FitMode, FitPath,
    ResizeQuality, StatsRecorder, TargetDimension,
};

const FULL_HD: TargetDimension = TargetDimension::new(1920, 1080);

/// Gradient background with a checkerboard patch, so saliency has something to find.
fn make_test_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    let (px, py) = (width / 3, height / 3);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let in_patch = x >= px && x < px + width / 6 && y >= py && y < py + height / 6;
        *pixel = if in_patch && (x / 6 + y / 6) % 2 == 0 {
            Rgb([250, 250, 250])
        } else {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        };
    }
    DynamicImage::ImageRgb8(img)
}

/// Mock face detector reporting one face at a fixed fraction of whatever buffer it sees.
struct MockDetector {
    rel: (f64, f64, f64, f64),
    confidence: f64,
}

impl MockDetector {
    fn with_face(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            rel: (x, y, width, height),
            confidence,
        }
    }
}

impl FaceDetector for MockDetector {
    fn detect(&self, _gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let (x, y, w, h) = self.rel;
        vec![FaceBounds {
            x: x * width as f64,
            y: y * height as f64,
            width: w * width as f64,
            height: h * height as f64,
            confidence: self.confidence,
        }]
    }
}

fn fast() -> FitConfig {
    FitConfig::default().resize_quality(ResizeQuality::Fast)
}

#[test]
fn identical_size_returns_source_pixels() {
    let source = make_test_image(640, 360);
    let target = TargetDimension::new(640, 360);
    let config = FitConfig::default();
    let out = FitEngine::new().fit(&source, target, &config).unwrap();

    assert!(matches!(out.image, Cow::Borrowed(_)));
    assert_eq!(out.image.as_bytes(), source.as_bytes());
    assert_eq!(out.stats.path, FitPath::Identity);
    assert!(out.stats.rect.is_none());
}

#[test]
fn scenario_a_scale_only() {
    let source = make_test_image(3840, 2160);
    let out = FitEngine::new().fit(&source, FULL_HD, &fast()).unwrap();

    assert_eq!(out.image.dimensions(), (1920, 1080));
    assert_eq!(out.stats.path, FitPath::Scale);
    assert!(!out.stats.found);
    assert!(out.stats.rect.is_none());
    assert!((out.stats.scale - 0.5).abs() < 1e-12);
}

#[test]
fn scenario_b_square_source_uses_saliency_crop() {
    let source = make_test_image(4096, 4096);
    let config = fast().mode(FitMode::Aggressive);
    let out = FitEngine::new().fit(&source, FULL_HD, &config).unwrap();

    assert_eq!(out.image.dimensions(), (1920, 1080));
    assert_eq!(out.stats.path, FitPath::Crop);
    assert!(!out.stats.found);
    let rect = out.stats.rect.expect("crop path records a rectangle");
    assert_eq!(rect.width, 4096);
    assert_eq!(rect.height, 2304);
    assert!(rect.is_within(4096, 4096));
}

#[test]
fn scenario_b_is_rejected_in_normal_mode() {
    let source = make_test_image(1024, 1024);
    let target = TargetDimension::new(640, 360);
    let result = FitEngine::new().fit(&source, target, &fast());
    assert!(matches!(result, Err(FitError::IncompatibleAspect { .. })));
}

#[test]
fn scenario_c_crop_anchored_on_face() {
    let source = make_test_image(3000, 2000);
    let detector = MockDetector::with_face(0.6, 0.55, 0.1, 0.15, 8.5);
    let engine = FitEngine::new().face_detector(detector);
    let config = fast();

    let out = engine.fit(&source, FULL_HD, &config).unwrap();

    assert_eq!(out.image.dimensions(), (1920, 1080));
    assert_eq!(out.stats.path, FitPath::Crop);
    assert!(out.stats.found);
    assert!((out.stats.quality - 8.5).abs() < f64::EPSILON);

    let faces = engine.detection().detect(&source, &config);
    assert_eq!(faces.len(), 1);
    let rect = out.stats.rect.unwrap();
    let face = faces[0].rect;
    assert!(rect.contains(&face), "{rect:?} misses {face:?}");
    assert!(rect.is_within(3000, 2000));
}

#[test]
fn low_confidence_face_falls_back_to_saliency() {
    let source = make_test_image(3000, 2000);
    let detector = MockDetector::with_face(0.6, 0.55, 0.1, 0.15, 4.0);
    let engine = FitEngine::new().face_detector(detector);
    let out = engine.fit(&source, FULL_HD, &fast()).unwrap();

    assert_eq!(out.stats.path, FitPath::Crop);
    assert!(!out.stats.found);
    assert_eq!(out.stats.quality, 0.0);
}

#[test]
fn tiny_face_is_ignored() {
    let source = make_test_image(3000, 2000);
    // 0.02 x 0.02 of the image = 0.04% of its area
    let detector = MockDetector::with_face(0.1, 0.1, 0.02, 0.02, 9.0);
    let engine = FitEngine::new().face_detector(detector);
    let out = engine.fit(&source, FULL_HD, &fast()).unwrap();
    assert!(!out.stats.found);
}

#[test]
fn face_crop_disabled_ignores_detector() {
    let source = make_test_image(3000, 2000);
    let detector = MockDetector::with_face(0.6, 0.55, 0.1, 0.15, 9.0);
    let engine = FitEngine::new().face_detector(detector);
    let config = fast().face_crop(false);
    let out = engine.fit(&source, FULL_HD, &config).unwrap();
    assert!(!out.stats.found);
    assert!(out.stats.rect.is_some());
}

#[test]
fn face_near_bottom_of_portrait_stays_in_frame() {
    let source = make_test_image(2000, 3000);
    let detector = MockDetector::with_face(0.4, 0.85, 0.15, 0.1, 9.0);
    let engine = FitEngine::new().face_detector(detector);
    let config = fast().mode(FitMode::Aggressive).face_boost(2.0);

    let out = engine.fit(&source, FULL_HD, &config).unwrap();
    let faces = engine.detection().detect(&source, &config);
    let rect = out.stats.rect.unwrap();
    let face = faces[0].rect;

    assert!(out.stats.found);
    assert_eq!(rect.width, 2000);
    assert_eq!(rect.height, 1125);
    assert!(rect.contains(&face), "{rect:?} misses {face:?}");
}

#[test]
fn one_pixel_short_depends_on_mode() {
    let narrow = make_test_image(1919, 1080);
    let short = make_test_image(1920, 1079);
    let engine = FitEngine::new();

    for source in [&narrow, &short] {
        let normal = engine.fit(source, FULL_HD, &fast());
        assert!(
            matches!(normal, Err(FitError::IncompatibleResolution { .. })),
            "{:?}",
            source.dimensions()
        );

        let aggressive = engine
            .fit(source, FULL_HD, &fast().mode(FitMode::Aggressive))
            .unwrap();
        assert_eq!(aggressive.image.dimensions(), (1920, 1080));
    }
}

#[test]
fn zero_sized_source_is_invalid() {
    let source = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
    let engine = FitEngine::new();
    let config = fast();
    let mut recorder = StatsRecorder::new();
    let result = engine.fit_with_recorder(&source, FULL_HD, &config, &mut recorder);
    assert!(matches!(result, Err(FitError::InvalidImage { .. })));
    assert_eq!(recorder.last().unwrap().path, FitPath::Rejected);
}

#[test]
fn output_is_deterministic() {
    let source = make_test_image(1200, 900);
    let target = TargetDimension::new(640, 360);
    let engine = FitEngine::new();
    let config = FitConfig::default();

    let first = engine.fit(&source, target, &config).unwrap();
    let second = engine.fit(&source, target, &config).unwrap();

    assert_eq!(first.stats.rect, second.stats.rect);
    assert_eq!(first.image.as_bytes(), second.image.as_bytes());
}

#[test]
fn every_successful_path_hits_the_target_exactly() {
    let detector = MockDetector::with_face(0.45, 0.3, 0.1, 0.1, 7.0);
    let engine = FitEngine::new().face_detector(detector);
    let target = TargetDimension::new(320, 180);
    let sources = [
        (320, 180),
        (640, 360),
        (640, 400),
        (480, 480),
        (1000, 300),
        (300, 170),
    ];

    for mode in FitMode::ALL {
        for (w, h) in sources {
            let source = make_test_image(w, h);
            let config = fast().mode(mode);
            match engine.fit(&source, target, &config) {
                Ok(out) => {
                    assert_eq!(out.image.dimensions(), (320, 180), "{w}x{h} {mode}");
                    if let Some(rect) = out.stats.rect {
                        assert!(rect.is_within(w, h));
                        let drift = (rect.aspect() - target.aspect()).abs();
                        assert!(drift < 0.02, "{rect:?}");
                    }
                }
                Err(FitError::IncompatibleAspect { .. }) => {}
                Err(FitError::IncompatibleResolution { .. }) => {}
                Err(e) => panic!("unexpected error for {w}x{h} {mode}: {e}"),
            }
        }
    }
}

#[test]
fn concurrent_fits_with_own_recorders_match_sequential() {
    let mock = MockDetector::with_face(0.5, 0.2, 0.12, 0.12, 9.0);
    let detector: Arc<dyn FaceDetector> = Arc::new(mock);
    let engine = FitEngine::with_detection(FaceDetection::shared(detector));
    let config = FitConfig::default().mode(FitMode::Aggressive);
    let target = TargetDimension::new(400, 225);
    let sources: Vec<DynamicImage> = [(800, 600), (900, 900), (1200, 675), (600, 800)]
        .iter()
        .map(|&(w, h)| make_test_image(w, h))
        .collect();

    let fit_bytes = |source: &DynamicImage| {
        let out = engine.fit(source, target, &config).unwrap();
        out.image.as_bytes().to_vec()
    };
    let sequential: Vec<Vec<u8>> = sources.iter().map(fit_bytes).collect();

    let concurrent: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let engine = &engine;
                let config = &config;
                scope.spawn(move || {
                    let mut recorder = StatsRecorder::new();
                    let image = engine
                        .fit_with_recorder(source, target, config, &mut recorder)
                        .unwrap();
                    assert!(recorder.last().is_some());
                    image.as_bytes().to_vec()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[test]
fn recorder_keeps_only_the_latest_call() {
    let engine = FitEngine::new();
    let mut recorder = StatsRecorder::new();
    let source = make_test_image(640, 360);
    let config = fast();
    let smaller = TargetDimension::new(320, 180);
    let larger = TargetDimension::new(1280, 720);

    engine
        .fit_with_recorder(&source, smaller, &config, &mut recorder)
        .unwrap();
    assert_eq!(recorder.last().unwrap().path, FitPath::Scale);

    let _ = engine.fit_with_recorder(&source, larger, &config, &mut recorder);
    assert_eq!(recorder.last().unwrap().path, FitPath::Rejected);
}

#[test]
fn smart_fit_disabled_crops_center_without_detection() {
    let source = make_test_image(3000, 2000);
    let detector = MockDetector::with_face(0.0, 0.0, 0.1, 0.1, 9.0);
    let engine = FitEngine::new().face_detector(detector);
    let config = fast().smart_fit(false);
    let out = engine.fit(&source, FULL_HD, &config).unwrap();

    let centered = wallfit::crop::aspect_fit(3000, 2000, 1920, 1080);
    assert!(!out.stats.found);
    assert_eq!(out.stats.rect, Some(centered));
}

#[test]
fn missing_model_degrades_to_saliency() {
    let detection = FaceDetection::from_loader(|| -> Result<MockDetector, FitError> {
        Err(FitError::ModelLoad("model file not found".into()))
    });
    let engine = FitEngine::with_detection(detection);
    let source = make_test_image(3000, 2000);
    let out = engine.fit(&source, FULL_HD, &fast()).unwrap();
    assert!(!out.stats.found);
    assert_eq!(out.stats.path, FitPath::Crop);
}
