//! Global constants for the annotation engine.

/// Multiplier applied per zoom step (wheel tick or zoom button).
pub const ZOOM_STEP: f32 = 1.12;

/// Minimum view scale.
pub const MIN_SCALE: f32 = 0.05;

/// Maximum view scale.
pub const MAX_SCALE: f32 = 30.0;

/// Margin factor applied by fit-to-contain so the image doesn't touch the
/// viewport edges.
pub const FIT_MARGIN: f32 = 0.98;

/// Distance threshold (canvas pixels) for closing a polygon by clicking near
/// its first vertex.
pub const POLY_CLOSE_THRESHOLD_PX: f32 = 12.0;

/// Hit radius (canvas pixels) for grabbing a polygon vertex of the selected
/// annotation.
pub const VERTEX_HIT_RADIUS_PX: f32 = 8.0;

/// Half-extent (canvas pixels) of the square hit area around each box resize
/// handle.
pub const HANDLE_SIZE_PX: f32 = 10.0;

/// Minimum width/height (image pixels) of a committed bounding box.
pub const MIN_BBOX_SIZE_IMG: f32 = 3.0;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Stroke color used when no label is active.
pub const DEFAULT_COLOR: &str = "#fb923c";
