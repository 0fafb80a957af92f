//! Hit testing: resolving a canvas click into an edit target.
//!
//! Annotations are tested back-to-front so the most recently added shape wins
//! ties. Per annotation the most specific target wins: selected-polygon
//! vertices and selected-box handles are checked before body hits.

use crate::constants::{HANDLE_SIZE_PX, VERTEX_HIT_RADIUS_PX};
use crate::model::{AnnotationId, BBox, Point, Shape};
use crate::store::Workspace;
use crate::view::ViewTransform;

/// One of the eight resize handles on a selected box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Handle {
    /// Whether this handle moves the top edge.
    pub fn north(&self) -> bool {
        matches!(self, Handle::N | Handle::Ne | Handle::Nw)
    }

    /// Whether this handle moves the bottom edge.
    pub fn south(&self) -> bool {
        matches!(self, Handle::S | Handle::Se | Handle::Sw)
    }

    /// Whether this handle moves the right edge.
    pub fn east(&self) -> bool {
        matches!(self, Handle::E | Handle::Ne | Handle::Se)
    }

    /// Whether this handle moves the left edge.
    pub fn west(&self) -> bool {
        matches!(self, Handle::W | Handle::Nw | Handle::Sw)
    }
}

/// Handle positions (image space) for a box: corners plus edge midpoints.
pub fn handle_points(b: &BBox) -> [(Handle, Point); 8] {
    let (x1, y1, x2, y2) = (b.x, b.y, b.x2(), b.y2());
    let xm = (x1 + x2) / 2.0;
    let ym = (y1 + y2) / 2.0;
    [
        (Handle::Nw, Point::new(x1, y1)),
        (Handle::N, Point::new(xm, y1)),
        (Handle::Ne, Point::new(x2, y1)),
        (Handle::E, Point::new(x2, ym)),
        (Handle::Se, Point::new(x2, y2)),
        (Handle::S, Point::new(xm, y2)),
        (Handle::Sw, Point::new(x1, y2)),
        (Handle::W, Point::new(x1, ym)),
    ]
}

/// The resolved target of a canvas click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    BoxResize { id: AnnotationId, handle: Handle },
    PolygonVertex { id: AnnotationId, index: usize },
    BoxMove { id: AnnotationId },
    PolygonMove { id: AnnotationId },
}

impl HitTarget {
    pub fn id(&self) -> AnnotationId {
        match *self {
            HitTarget::BoxResize { id, .. }
            | HitTarget::PolygonVertex { id, .. }
            | HitTarget::BoxMove { id }
            | HitTarget::PolygonMove { id } => id,
        }
    }
}

fn hit_handle(b: &BBox, view: &ViewTransform, canvas: Point) -> Option<Handle> {
    for (handle, p) in handle_points(b) {
        let c = view.image_to_canvas(p);
        if (canvas.x - c.x).abs() <= HANDLE_SIZE_PX && (canvas.y - c.y).abs() <= HANDLE_SIZE_PX {
            return Some(handle);
        }
    }
    None
}

/// Resolve the most specific interactive target under a canvas point on the
/// current image. Hidden annotations are never tested; None means "empty
/// canvas" (start a new shape or deselect).
pub fn hit_test(ws: &Workspace, view: &ViewTransform, canvas: Point) -> Option<HitTarget> {
    let image = ws.current()?;
    let ip = view.canvas_to_image(canvas);

    for ann in image.annotations.iter().rev() {
        if ws.effective_hidden(ann) {
            continue;
        }
        let selected = ws.selected == Some(ann.id);

        match &ann.shape {
            Shape::Polygon { points } => {
                if selected {
                    // Vertex grab radius is constant on screen, so shrink it
                    // by the current scale in image space.
                    let tol = VERTEX_HIT_RADIUS_PX / view.scale;
                    for (index, p) in points.iter().enumerate() {
                        if ip.distance_to(*p) <= tol {
                            return Some(HitTarget::PolygonVertex { id: ann.id, index });
                        }
                    }
                }
                if ann.shape.contains(ip) {
                    return Some(HitTarget::PolygonMove { id: ann.id });
                }
            }
            Shape::BBox(b) => {
                if selected {
                    if let Some(handle) = hit_handle(b, view, canvas) {
                        return Some(HitTarget::BoxResize { id: ann.id, handle });
                    }
                }
                if b.contains(ip) {
                    return Some(HitTarget::BoxMove { id: ann.id });
                }
            }
        }
    }
    None
}
