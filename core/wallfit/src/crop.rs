use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle within a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from floating-point bounds, clipped to a `bounds_width` × `bounds_height`
    /// image. Returns `None` when nothing of the box lies inside the image.
    pub fn from_bounds_clipped(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        bounds_width: u32,
        bounds_height: u32,
    ) -> Option<Self> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return None;
        }
        let left = x.round().clamp(0.0, bounds_width as f64);
        let top = y.round().clamp(0.0, bounds_height as f64);
        let right = (x + width).round().clamp(0.0, bounds_width as f64);
        let bottom = (y + height).round().clamp(0.0, bounds_height as f64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center point, in fractional pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Width / height. Zero-height rectangles report `0.0`.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the rectangle lies entirely inside a `width` × `height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Grow by `margin_x` / `margin_y` pixels on each side, clipped to the image.
    pub fn expanded(
        &self,
        margin_x: f64,
        margin_y: f64,
        bounds_width: u32,
        bounds_height: u32,
    ) -> Rect {
        Rect::from_bounds_clipped(
            self.x as f64 - margin_x,
            self.y as f64 - margin_y,
            self.width as f64 + 2.0 * margin_x,
            self.height as f64 + 2.0 * margin_y,
            bounds_width,
            bounds_height,
        )
        .unwrap_or(*self)
    }

    /// Translate (never resize) so the rectangle fits inside the image.
    pub fn clamp_within(&self, bounds_width: u32, bounds_height: u32) -> Rect {
        Rect {
            x: self.x.min(bounds_width.saturating_sub(self.width)),
            y: self.y.min(bounds_height.saturating_sub(self.height)),
            ..*self
        }
    }

    /// Translate by the smallest amount that brings `inner` inside this rectangle, on each axis
    /// where `inner` is not larger than the rectangle. Axes where it cannot fit are left alone.
    pub fn shifted_to_contain(&self, inner: &Rect) -> Rect {
        let mut out = *self;
        if inner.width <= self.width {
            if inner.x < self.x {
                out.x = inner.x;
            } else if inner.right() > self.right() {
                out.x = inner.right() - self.width;
            }
        }
        if inner.height <= self.height {
            if inner.y < self.y {
                out.y = inner.y;
            } else if inner.bottom() > self.bottom() {
                out.y = inner.bottom() - self.height;
            }
        }
        out
    }
}

/// Place a `width` × `height` rectangle centered on `(center_x, center_y)`, translated to stay
/// inside the image.
pub fn place_centered(
    width: u32,
    height: u32,
    center_x: f64,
    center_y: f64,
    bounds_width: u32,
    bounds_height: u32,
) -> Rect {
    let max_x = bounds_width.saturating_sub(width) as f64;
    let max_y = bounds_height.saturating_sub(height) as f64;
    let x = (center_x - width as f64 / 2.0).round().max(0.0).min(max_x) as u32;
    let y = (center_y - height as f64 / 2.0).round().max(0.0).min(max_y) as u32;
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Largest rectangle with the target aspect ratio that fits in the source, centered.
///
/// The constrained side spans the full source; the other side is rounded to the nearest pixel,
/// so the rectangle's aspect matches the target to within one pixel.
pub fn aspect_fit(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> Rect {
    let target_aspect = target_width as f64 / target_height as f64;

    let (crop_width, crop_height) =
        if (source_width as f64 / source_height as f64) > target_aspect {
            // Source is wider than the target, constrain by height
            let h = source_height;
            let w = ((h as f64 * target_aspect).round() as u32).clamp(1, source_width);
            (w, h)
        } else {
            // Source is taller than (or equal to) the target, constrain by width
            let w = source_width;
            let h = ((w as f64 / target_aspect).round() as u32).clamp(1, source_height);
            (w, h)
        };

    Rect {
        x: (source_width - crop_width) / 2,
        y: (source_height - crop_height) / 2,
        width: crop_width,
        height: crop_height,
    }
}
