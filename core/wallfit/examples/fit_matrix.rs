//! Run every fit mode and face option over a set of synthetic sources.
//!
//! Usage:
//!   RUST_LOG=wallfit=debug cargo run --example fit_matrix [-- output.png]
//!
//! Prints one stats line per combination and writes a contact sheet with one row per source and
//! one column per combination (default: `fit_matrix.png` in the working directory).

use std::error::Error;

use image::{imageops, DynamicImage, Rgb, RgbImage, RgbaImage};
use wallfit::{
    FaceBounds, FaceDetector, FitConfig, FitEngine, FitMode, ResizeQuality, TargetDimension,
};

const TARGET: TargetDimension = TargetDimension::new(480, 270);
const CELL_GAP: u32 = 8;

/// Pretends a face sits at a fixed fraction of the frame.
struct PlacedFace {
    x: f64,
    y: f64,
    size: f64,
}

impl PlacedFace {
    fn at(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }
}

impl FaceDetector for PlacedFace {
    fn detect(&self, _gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let edge = self.size * width.min(height) as f64;
        vec![FaceBounds {
            x: self.x * width as f64 - edge / 2.0,
            y: self.y * height as f64 - edge / 2.0,
            width: edge,
            height: edge,
            confidence: 9.0,
        }]
    }
}

/// Flat background with a bright disc where the "face" is and some texture elsewhere.
fn synthetic(width: u32, height: u32, face: &PlacedFace) -> DynamicImage {
    let (fx, fy) = (face.x * width as f64, face.y * height as f64);
    let radius = face.size * width.min(height) as f64 / 2.0;
    let img = RgbImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f64 - fx, y as f64 - fy);
        if dx * dx + dy * dy <= radius * radius {
            Rgb([230, 190, 160])
        } else if x < width / 4 && (x / 4 + y / 4) % 2 == 0 {
            Rgb([40, 40, 40])
        } else {
            Rgb([70, 110, (y * 200 / height) as u8])
        }
    });
    DynamicImage::ImageRgb8(img)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "fit_matrix.png".to_string());

    let sources = [
        ("landscape", 1800, 1200, PlacedFace::at(0.7, 0.35, 0.2)),
        ("square", 1200, 1200, PlacedFace::at(0.5, 0.8, 0.15)),
        ("portrait", 900, 1600, PlacedFace::at(0.3, 0.2, 0.25)),
        ("wide", 2400, 900, PlacedFace::at(0.9, 0.5, 0.3)),
    ];

    let mut columns = Vec::new();
    for mode in FitMode::ALL {
        for face_crop in [false, true] {
            for boost in [false, true] {
                let mut config = FitConfig::default()
                    .mode(mode)
                    .face_crop(face_crop)
                    .resize_quality(ResizeQuality::Balanced);
                if boost {
                    config = config.face_boost(2.0);
                }
                columns.push((format!("{mode}/face={face_crop}/boost={boost}"), config));
            }
        }
    }

    let sheet_w = columns.len() as u32 * (TARGET.width + CELL_GAP) + CELL_GAP;
    let sheet_h = sources.len() as u32 * (TARGET.height + CELL_GAP) + CELL_GAP;
    let mut sheet = RgbaImage::from_pixel(sheet_w, sheet_h, image::Rgba([20, 20, 20, 255]));

    for (row, (name, width, height, face)) in sources.into_iter().enumerate() {
        let source = synthetic(width, height, &face);
        let engine = FitEngine::new().face_detector(face);
        println!("{name} ({width}x{height})");

        for (col, (label, config)) in columns.iter().enumerate() {
            let out = engine.fit(&source, TARGET, config);
            let x = CELL_GAP + col as u32 * (TARGET.width + CELL_GAP);
            let y = CELL_GAP + row as u32 * (TARGET.height + CELL_GAP);
            match out {
                Ok(fitted) => {
                    let s = &fitted.stats;
                    println!(
                        "  {label:<32} {:?} found={} quality={:.1} scale={:.3} rect={:?} {:.1?}",
                        s.path, s.found, s.quality, s.scale, s.rect, s.duration
                    );
                    imageops::replace(&mut sheet, &fitted.image.to_rgba8(), x.into(), y.into());
                }
                Err(e) => println!("  {label:<32} rejected: {e}"),
            }
        }
    }

    sheet.save(&output)?;
    println!("wrote {output}");
    Ok(())
}
