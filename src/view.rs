//! View transform between image and canvas space.
//!
//! The transform is a uniform scale plus offset; `canvas = image * scale +
//! offset`. Zoom always operates around an anchor point so the image content
//! under the cursor stays fixed.

use crate::constants::{FIT_MARGIN, MAX_SCALE, MIN_SCALE};
use crate::model::Point;

/// Pan/zoom state for the image canvas.
///
/// Not persisted; recomputed via [`ViewTransform::fit_to_contain`] whenever
/// an image is selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub ox: f32,
    pub oy: f32,
}

impl ViewTransform {
    /// Identity transform (scale 1, no offset).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            ox: 0.0,
            oy: 0.0,
        }
    }

    /// Map an image-space point to canvas space.
    pub fn image_to_canvas(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.ox, p.y * self.scale + self.oy)
    }

    /// Map a canvas-space point to image space. Inverse of
    /// [`ViewTransform::image_to_canvas`].
    pub fn canvas_to_image(&self, p: Point) -> Point {
        Point::new((p.x - self.ox) / self.scale, (p.y - self.oy) / self.scale)
    }

    /// Fit the image inside the viewport with a small margin and center it.
    ///
    /// The scale is clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub fn fit_to_contain(&mut self, image_w: f32, image_h: f32, viewport_w: f32, viewport_h: f32) {
        let s = (viewport_w / image_w).min(viewport_h / image_h) * FIT_MARGIN;
        self.scale = s.clamp(MIN_SCALE, MAX_SCALE);
        self.ox = (viewport_w - image_w * self.scale) / 2.0;
        self.oy = (viewport_h - image_h * self.scale) / 2.0;
    }

    /// Rescale by `factor` while keeping the image point under the canvas
    /// anchor fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) {
        let old = self.scale;
        let next = (old * factor).clamp(MIN_SCALE, MAX_SCALE);
        let k = next / old;

        self.ox = anchor.x - (anchor.x - self.ox) * k;
        self.oy = anchor.y - (anchor.y - self.oy) * k;
        self.scale = next;
    }

    /// Translate the view by a canvas-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.ox += dx;
        self.oy += dy;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}
