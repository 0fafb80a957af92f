//! Annotation geometry and metadata.
//!
//! All geometry is stored in image-pixel coordinates. Conversion to canvas
//! coordinates happens in [`crate::view`].

use serde::{Deserialize, Serialize};

use crate::constants::MIN_POLYGON_VERTICES;
use crate::model::LabelId;

/// Unique identifier for an annotation.
pub type AnnotationId = u64;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp the point into `[0, width] x [0, height]`.
    pub fn clamped(&self, width: f32, height: f32) -> Point {
        Point::new(self.x.clamp(0.0, width), self.y.clamp(0.0, height))
    }
}

/// An axis-aligned bounding box, stored as top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a normalized box from two corner points (any orientation).
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    /// Right edge X coordinate.
    pub fn x2(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge Y coordinate.
    pub fn y2(&self) -> f32 {
        self.y + self.h
    }

    /// Check if a point is inside the box (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x2() && p.y >= self.y && p.y <= self.y2()
    }

    /// Clamp the box into `[0, width] x [0, height]`, shrinking it if needed.
    pub fn clamped_to(&self, width: f32, height: f32) -> BBox {
        let x = self.x.clamp(0.0, width);
        let y = self.y.clamp(0.0, height);
        BBox {
            x,
            y,
            w: self.w.clamp(0.0, width - x),
            h: self.h.clamp(0.0, height - y),
        }
    }
}

/// The kind of shape an annotation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    BBox,
    Polygon,
}

impl ShapeKind {
    /// Display name for this shape kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::BBox => "Bounding Box",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// Shape geometry of an annotation (image coordinates).
///
/// Polygon closure is implicit: the last vertex connects back to the first,
/// and no duplicate closing vertex is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    BBox(BBox),
    Polygon { points: Vec<Point> },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::BBox(_) => ShapeKind::BBox,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Axis-aligned bounding box of this shape. None for an empty polygon.
    pub fn bounding_box(&self) -> Option<BBox> {
        match self {
            Shape::BBox(b) => Some(*b),
            Shape::Polygon { points } => {
                if points.is_empty() {
                    return None;
                }
                let mut min_x = f32::INFINITY;
                let mut min_y = f32::INFINITY;
                let mut max_x = f32::NEG_INFINITY;
                let mut max_y = f32::NEG_INFINITY;
                for p in points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Some(BBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
            }
        }
    }

    /// Check if an image-space point falls inside this shape.
    ///
    /// Polygons use the even-odd ray casting test. Horizontal edges get a
    /// tiny epsilon in the denominator to avoid division by zero.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Shape::BBox(b) => b.contains(p),
            Shape::Polygon { points } => {
                if points.len() < MIN_POLYGON_VERTICES {
                    return false;
                }
                let mut inside = false;
                let mut j = points.len() - 1;
                for i in 0..points.len() {
                    let (xi, yi) = (points[i].x, points[i].y);
                    let (xj, yj) = (points[j].x, points[j].y);
                    let dy = if (yj - yi).abs() < 1e-9 { 1e-9 } else { yj - yi };
                    if ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / dy + xi) {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

/// A single annotation attached to one image.
///
/// `label_id` is a weak reference: deleting the label leaves the id in place
/// and resolution simply fails, rendering the annotation "unlabeled".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub shape: Shape,
    /// Stroke color captured at creation time (hex, e.g. `#fb923c`).
    pub color: String,
    #[serde(default)]
    pub label_id: Option<LabelId>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Annotation {
    pub fn new(id: AnnotationId, shape: Shape, color: impl Into<String>) -> Self {
        Self {
            id,
            shape,
            color: color.into(),
            label_id: None,
            hidden: false,
            locked: false,
        }
    }

    pub fn with_label(mut self, label_id: Option<LabelId>) -> Self {
        self.label_id = label_id;
        self
    }
}
