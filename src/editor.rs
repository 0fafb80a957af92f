//! The pointer-driven edit state machine.
//!
//! Pointer events arrive in canvas coordinates, get mapped into image space
//! through the view transform, and become either a draw session (new box or
//! polygon) or a drag session (move/resize/vertex edit on an existing
//! annotation). During a drag the live annotation is mutated directly for
//! immediate feedback; the change only reaches [`CommandHistory`] as a single
//! command at pointer-up, and only if the geometry actually changed.

use crate::constants::{MIN_BBOX_SIZE_IMG, MIN_POLYGON_VERTICES, POLY_CLOSE_THRESHOLD_PX};
use crate::hit::{Handle, HitTarget, hit_test};
use crate::history::{Command, CommandHistory};
use crate::model::{Annotation, AnnotationId, BBox, ImageId, Point, Shape};
use crate::store::Workspace;
use crate::view::ViewTransform;

/// Which kind of shape new drawings produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    BBox,
    Polygon,
}

/// The drag operation kinds a hit target can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    BoxMove,
    BoxResize(Handle),
    PolygonMove,
    PolygonVertex(usize),
}

/// Transient state of an in-progress drag. Lives only between pointer-down
/// and pointer-up/cancel; never persisted.
#[derive(Debug, Clone)]
struct DragSession {
    kind: DragKind,
    image_id: ImageId,
    ann_id: AnnotationId,
    /// Image-space anchor where the drag started.
    start: Point,
    /// Geometry snapshot at drag start. Deltas are always computed against
    /// this, not against the previous frame, to avoid drift.
    base: Shape,
    /// Full snapshot for the history command at drag end.
    before: Annotation,
}

/// An in-progress box draw.
#[derive(Debug, Clone, Copy)]
struct BoxDraft {
    start: Point,
    rect: BBox,
}

/// The edit state machine. At most one draw or drag session is live at a
/// time.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    mode: ToolMode,
    drag: Option<DragSession>,
    box_draft: Option<BoxDraft>,
    poly_points: Vec<Point>,
    poly_hover: Option<Point>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switch draw mode, discarding any in-progress session.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
        self.cancel();
    }

    /// Discard the live session without committing anything. Used on mode
    /// switch, image navigation, and deselect.
    pub fn cancel(&mut self) {
        if self.drag.is_some() || self.box_draft.is_some() || !self.poly_points.is_empty() {
            log::debug!("editor: session discarded");
        }
        self.drag = None;
        self.box_draft = None;
        self.poly_points.clear();
        self.poly_hover = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_drawing_polygon(&self) -> bool {
        !self.poly_points.is_empty()
    }

    /// The box currently being drawn, for preview rendering.
    pub fn box_draft(&self) -> Option<BBox> {
        self.box_draft.map(|d| d.rect)
    }

    /// Vertices of the polygon currently being authored, for preview
    /// rendering.
    pub fn polygon_draft(&self) -> &[Point] {
        &self.poly_points
    }

    /// The hover point trailing the polygon draft, for preview rendering.
    pub fn polygon_hover(&self) -> Option<Point> {
        self.poly_hover
    }

    // ========================================================================
    // Pointer transitions
    // ========================================================================

    /// Pointer pressed on the canvas.
    pub fn pointer_down(
        &mut self,
        ws: &mut Workspace,
        history: &mut CommandHistory,
        view: &ViewTransform,
        canvas: Point,
    ) {
        // Exactly one session slot: a stray second press (e.g. a second
        // pointer) cannot start another session mid-drag.
        if self.drag.is_some() || self.box_draft.is_some() {
            return;
        }
        let Some(image) = ws.current() else {
            return;
        };
        let (image_id, img_w, img_h) = (image.id, image.width as f32, image.height as f32);
        let ip = view.canvas_to_image(canvas).clamped(img_w, img_h);

        if let Some(hit) = hit_test(ws, view, canvas) {
            ws.selected = Some(hit.id());
            let Some(ann) = ws.current().and_then(|i| i.annotation(hit.id())) else {
                return;
            };
            // A locked target can be selected for display but never dragged.
            if ws.effective_locked(ann) {
                return;
            }
            let kind = match hit {
                HitTarget::BoxMove { .. } => DragKind::BoxMove,
                HitTarget::BoxResize { handle, .. } => DragKind::BoxResize(handle),
                HitTarget::PolygonMove { .. } => DragKind::PolygonMove,
                HitTarget::PolygonVertex { index, .. } => DragKind::PolygonVertex(index),
            };
            self.drag = Some(DragSession {
                kind,
                image_id,
                ann_id: ann.id,
                start: ip,
                base: ann.shape.clone(),
                before: ann.clone(),
            });
            return;
        }

        ws.selected = None;
        match self.mode {
            ToolMode::BBox => {
                self.box_draft = Some(BoxDraft {
                    start: ip,
                    rect: BBox::new(ip.x, ip.y, 0.0, 0.0),
                });
            }
            ToolMode::Polygon => self.polygon_click(ws, history, view, ip, canvas),
        }
    }

    /// Pointer moved over the canvas.
    pub fn pointer_move(&mut self, ws: &mut Workspace, view: &ViewTransform, canvas: Point) {
        let Some(image) = ws.current() else {
            return;
        };
        let (img_w, img_h) = (image.width as f32, image.height as f32);
        let ip = view.canvas_to_image(canvas).clamped(img_w, img_h);

        if let Some(drag) = self.drag.clone() {
            // Defensive: the target may have been hidden or removed by an
            // external mutation mid-drag.
            let locked = ws
                .current()
                .and_then(|i| i.annotation(drag.ann_id))
                .map(|a| ws.effective_hidden(a) || ws.effective_locked(a));
            let Some(false) = locked else {
                return;
            };
            let Some(ann) = ws.current_mut().and_then(|i| i.annotation_mut(drag.ann_id)) else {
                return;
            };
            apply_drag(ann, &drag, ip, img_w, img_h);
            return;
        }

        if let Some(draft) = &mut self.box_draft {
            draft.rect = BBox::from_corners(draft.start, ip);
            return;
        }

        if self.mode == ToolMode::Polygon && !self.poly_points.is_empty() {
            self.poly_hover = Some(ip);
        }
    }

    /// Pointer released. Finalizes drags and box draws.
    pub fn pointer_up(&mut self, ws: &mut Workspace, history: &mut CommandHistory) {
        if let Some(drag) = self.drag.take() {
            let after = ws
                .image(drag.image_id)
                .and_then(|i| i.annotation(drag.ann_id))
                .cloned();
            if let Some(after) = after {
                if after != drag.before {
                    history.commit(
                        ws,
                        Command::ReplaceAnnotation {
                            image_id: drag.image_id,
                            before: drag.before,
                            after,
                        },
                    );
                }
            }
            return;
        }

        if let Some(draft) = self.box_draft.take() {
            let Some(image) = ws.current() else {
                return;
            };
            let (image_id, img_w, img_h) = (image.id, image.width as f32, image.height as f32);
            let rect = draft.rect.clamped_to(img_w, img_h);
            if rect.w < MIN_BBOX_SIZE_IMG || rect.h < MIN_BBOX_SIZE_IMG {
                // Too small: silently discarded, no command.
                return;
            }
            let id = ws.alloc_annotation_id();
            let annotation = Annotation::new(id, Shape::BBox(rect), ws.active_color())
                .with_label(ws.active_label);
            history.commit(
                ws,
                Command::AddAnnotation {
                    image_id,
                    annotation,
                },
            );
        }
    }

    /// A click while in polygon mode: start, extend, or close the draft.
    fn polygon_click(
        &mut self,
        ws: &mut Workspace,
        history: &mut CommandHistory,
        view: &ViewTransform,
        ip: Point,
        canvas: Point,
    ) {
        if self.poly_points.is_empty() {
            self.poly_points.push(ip);
            return;
        }

        let first_canvas = view.image_to_canvas(self.poly_points[0]);
        let closing = self.poly_points.len() >= MIN_POLYGON_VERTICES
            && canvas.distance_to(first_canvas) <= POLY_CLOSE_THRESHOLD_PX;

        if closing {
            let points = std::mem::take(&mut self.poly_points);
            self.poly_hover = None;
            let Some(image_id) = ws.current().map(|i| i.id) else {
                return;
            };
            let id = ws.alloc_annotation_id();
            let annotation = Annotation::new(id, Shape::Polygon { points }, ws.active_color())
                .with_label(ws.active_label);
            history.commit(
                ws,
                Command::AddAnnotation {
                    image_id,
                    annotation,
                },
            );
        } else {
            self.poly_points.push(ip);
        }
    }
}

/// Saturating clamp. Unlike [`f32::clamp`] this never panics on an inverted
/// range, which occurs when geometry entered the workspace already out of
/// image bounds (e.g. from a restored session); the high bound wins.
fn clamp_sat(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Recompute the dragged annotation's geometry from the session's base
/// snapshot and the current pointer position.
fn apply_drag(ann: &mut Annotation, drag: &DragSession, ip: Point, img_w: f32, img_h: f32) {
    match (drag.kind, &drag.base) {
        (DragKind::BoxMove, Shape::BBox(base)) => {
            let dx = ip.x - drag.start.x;
            let dy = ip.y - drag.start.y;
            // Clamp position, not size: the box keeps its extent and stops
            // at the image border.
            ann.shape = Shape::BBox(BBox::new(
                clamp_sat(base.x + dx, 0.0, img_w - base.w),
                clamp_sat(base.y + dy, 0.0, img_h - base.h),
                base.w,
                base.h,
            ));
        }
        (DragKind::BoxResize(handle), Shape::BBox(base)) => {
            ann.shape = Shape::BBox(resize_box(base, handle, ip, img_w, img_h));
        }
        (DragKind::PolygonMove, Shape::Polygon { points: base }) => {
            let dx = ip.x - drag.start.x;
            let dy = ip.y - drag.start.y;

            // Clamp the delta against the base point set's bounding box,
            // computed once per drag from the original points.
            let mut min_x = f32::INFINITY;
            let mut min_y = f32::INFINITY;
            let mut max_x = f32::NEG_INFINITY;
            let mut max_y = f32::NEG_INFINITY;
            for p in base {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            let cdx = clamp_sat(dx, -min_x, img_w - max_x);
            let cdy = clamp_sat(dy, -min_y, img_h - max_y);

            ann.shape = Shape::Polygon {
                points: base.iter().map(|p| Point::new(p.x + cdx, p.y + cdy)).collect(),
            };
        }
        (DragKind::PolygonVertex(index), _) => {
            if let Shape::Polygon { points } = &mut ann.shape {
                if let Some(p) = points.get_mut(index) {
                    *p = ip.clamped(img_w, img_h);
                }
            }
        }
        // Hit kind and stored geometry can only disagree if the shape was
        // swapped externally mid-drag; do nothing.
        _ => {}
    }
}

/// Resize `base` by moving the edges owned by `handle` to the pointer, then
/// normalize, enforce the minimum size against the anchored edge, and clamp
/// into image bounds.
fn resize_box(base: &BBox, handle: Handle, ip: Point, img_w: f32, img_h: f32) -> BBox {
    let (mut nx1, mut ny1, mut nx2, mut ny2) = (base.x, base.y, base.x2(), base.y2());

    if handle.north() {
        ny1 = ip.y;
    }
    if handle.south() {
        ny2 = ip.y;
    }
    if handle.west() {
        nx1 = ip.x;
    }
    if handle.east() {
        nx2 = ip.x;
    }

    let mut x1 = nx1.min(nx2);
    let mut x2 = nx1.max(nx2);
    let mut y1 = ny1.min(ny2);
    let mut y2 = ny1.max(ny2);

    // Pull the non-anchor edge back when the box collapses below minimum.
    if x2 - x1 < MIN_BBOX_SIZE_IMG {
        if handle.west() {
            x1 = x2 - MIN_BBOX_SIZE_IMG;
        } else {
            x2 = x1 + MIN_BBOX_SIZE_IMG;
        }
    }
    if y2 - y1 < MIN_BBOX_SIZE_IMG {
        if handle.north() {
            y1 = y2 - MIN_BBOX_SIZE_IMG;
        } else {
            y2 = y1 + MIN_BBOX_SIZE_IMG;
        }
    }

    x1 = x1.clamp(0.0, img_w);
    x2 = x2.clamp(0.0, img_w);
    y1 = y1.clamp(0.0, img_h);
    y2 = y2.clamp(0.0, img_h);

    BBox::new(
        x1,
        y1,
        clamp_sat(x2 - x1, MIN_BBOX_SIZE_IMG, img_w - x1),
        clamp_sat(y2 - y1, MIN_BBOX_SIZE_IMG, img_h - y1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct Rig {
        ws: Workspace,
        history: CommandHistory,
        view: ViewTransform,
        editor: Editor,
    }

    impl Rig {
        fn new(width: u32, height: u32) -> Self {
            init_logs();
            let mut ws = Workspace::new();
            let image_id = ws.add_image("test.png", width, height);
            ws.select_image(image_id);
            Self {
                ws,
                history: CommandHistory::new(),
                view: ViewTransform::identity(),
                editor: Editor::new(),
            }
        }

        fn down(&mut self, x: f32, y: f32) {
            self.editor
                .pointer_down(&mut self.ws, &mut self.history, &self.view, Point::new(x, y));
        }

        fn motion(&mut self, x: f32, y: f32) {
            self.editor
                .pointer_move(&mut self.ws, &self.view, Point::new(x, y));
        }

        fn up(&mut self) {
            self.editor.pointer_up(&mut self.ws, &mut self.history);
        }

        fn click(&mut self, x: f32, y: f32) {
            self.down(x, y);
            self.up();
        }

        fn annotations(&self) -> &[Annotation] {
            &self.ws.current().unwrap().annotations
        }

        fn bbox(&self, index: usize) -> BBox {
            match &self.annotations()[index].shape {
                Shape::BBox(b) => *b,
                other => panic!("expected bbox, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_draw_box_commits_normalized_rect() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(100.0, 60.0);
        rig.up();

        assert_eq!(rig.annotations().len(), 1);
        assert_eq!(rig.bbox(0), BBox::new(10.0, 10.0, 90.0, 50.0));
        assert_eq!(rig.ws.selected, Some(rig.annotations()[0].id));
        assert!(rig.history.can_undo());
    }

    #[test]
    fn test_tiny_box_draw_discarded_silently() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(11.0, 11.0);
        rig.up();

        assert!(rig.annotations().is_empty());
        assert!(!rig.history.can_undo());
    }

    #[test]
    fn test_box_draw_reversed_corners() {
        let mut rig = Rig::new(200, 150);
        rig.down(100.0, 60.0);
        rig.motion(10.0, 10.0);
        rig.up();

        assert_eq!(rig.bbox(0), BBox::new(10.0, 10.0, 90.0, 50.0));
    }

    #[test]
    fn test_box_move_clamps_to_bounds() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();

        // Grab the box body and shove it far past the top-left corner.
        rig.down(30.0, 30.0);
        rig.motion(-500.0, -500.0);
        rig.up();

        let b = rig.bbox(0);
        assert_eq!((b.x, b.y), (0.0, 0.0));
        assert_eq!((b.w, b.h), (50.0, 50.0));
    }

    #[test]
    fn test_box_move_unchanged_is_not_committed() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();
        assert_eq!(rig.history.undo_count(), 1);

        // Press and release without moving: no geometry delta, no command.
        rig.down(30.0, 30.0);
        rig.up();
        assert_eq!(rig.history.undo_count(), 1);
    }

    #[test]
    fn test_resize_east_handle_moves_only_right_edge() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();

        // Selected after the draw; east handle sits at (60, 35).
        rig.down(60.0, 35.0);
        rig.motion(120.0, 35.0);
        rig.up();

        assert_eq!(rig.bbox(0), BBox::new(10.0, 10.0, 110.0, 50.0));
    }

    #[test]
    fn test_resize_past_opposite_edge_never_negative() {
        let mut rig = Rig::new(200, 150);
        rig.down(50.0, 50.0);
        rig.motion(100.0, 100.0);
        rig.up();

        // Drag the east handle far past the west edge.
        rig.down(100.0, 75.0);
        rig.motion(20.0, 75.0);
        rig.up();

        let b = rig.bbox(0);
        assert!(b.w >= MIN_BBOX_SIZE_IMG);
        assert!(b.h >= MIN_BBOX_SIZE_IMG);
        // Orientation flipped: the box now hangs west of the old west edge.
        assert!((b.x - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_resize_collapse_clamps_on_anchored_edge() {
        let mut rig = Rig::new(200, 150);
        rig.down(50.0, 50.0);
        rig.motion(100.0, 100.0);
        rig.up();

        // Push the east handle exactly onto the west edge.
        rig.down(100.0, 75.0);
        rig.motion(50.0, 75.0);
        rig.up();

        let b = rig.bbox(0);
        assert_eq!(b.x, 50.0);
        assert_eq!(b.w, MIN_BBOX_SIZE_IMG);
    }

    #[test]
    fn test_locked_target_selects_but_never_drags() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();
        let id = rig.annotations()[0].id;
        rig.ws.current_mut().unwrap().annotation_mut(id).unwrap().locked = true;
        rig.ws.selected = None;

        rig.down(30.0, 30.0);
        assert_eq!(rig.ws.selected, Some(id));
        assert!(!rig.editor.is_dragging());

        rig.motion(80.0, 80.0);
        rig.up();
        assert_eq!(rig.bbox(0), BBox::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(rig.history.undo_count(), 1);
    }

    #[test]
    fn test_polygon_draw_close_near_first_point() {
        let mut rig = Rig::new(200, 150);
        rig.editor.set_mode(ToolMode::Polygon);

        rig.click(20.0, 20.0);
        rig.click(80.0, 20.0);
        rig.click(80.0, 80.0);
        assert!(rig.editor.is_drawing_polygon());
        assert!(rig.annotations().is_empty());

        // Click within the close threshold of the first point.
        rig.click(25.0, 24.0);
        assert!(!rig.editor.is_drawing_polygon());
        assert_eq!(rig.annotations().len(), 1);

        match &rig.annotations()[0].shape {
            Shape::Polygon { points } => {
                // No closing duplicate stored.
                assert_eq!(points.len(), 3);
                assert_eq!(points[0], Point::new(20.0, 20.0));
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_close_needs_three_points() {
        let mut rig = Rig::new(200, 150);
        rig.editor.set_mode(ToolMode::Polygon);

        rig.click(20.0, 20.0);
        rig.click(80.0, 20.0);
        // Near the first point, but only 2 points exist: extends, not closes.
        rig.click(25.0, 24.0);
        assert!(rig.editor.is_drawing_polygon());
        assert!(rig.annotations().is_empty());
    }

    #[test]
    fn test_polygon_abandoned_on_mode_switch() {
        let mut rig = Rig::new(200, 150);
        rig.editor.set_mode(ToolMode::Polygon);
        rig.click(20.0, 20.0);
        rig.click(80.0, 20.0);

        rig.editor.set_mode(ToolMode::BBox);
        assert!(!rig.editor.is_drawing_polygon());
        assert!(rig.annotations().is_empty());
        assert!(!rig.history.can_undo());
    }

    #[test]
    fn test_polygon_vertex_drag_moves_single_vertex() {
        let mut rig = Rig::new(200, 150);
        rig.editor.set_mode(ToolMode::Polygon);
        rig.click(20.0, 20.0);
        rig.click(80.0, 20.0);
        rig.click(80.0, 80.0);
        rig.click(21.0, 21.0);
        let id = rig.annotations()[0].id;
        rig.ws.selected = Some(id);

        rig.down(80.0, 20.0);
        rig.motion(90.0, 10.0);
        rig.up();

        match &rig.annotations()[0].shape {
            Shape::Polygon { points } => {
                assert_eq!(points[0], Point::new(20.0, 20.0));
                assert_eq!(points[1], Point::new(90.0, 10.0));
                assert_eq!(points[2], Point::new(80.0, 80.0));
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_move_clamped_by_original_bbox() {
        let mut rig = Rig::new(200, 150);
        rig.editor.set_mode(ToolMode::Polygon);
        rig.click(20.0, 20.0);
        rig.click(80.0, 20.0);
        rig.click(80.0, 80.0);
        rig.click(21.0, 21.0);

        // Drag the body way past the right edge; the bounding box stops at
        // the border and the vertex count is unchanged.
        rig.down(60.0, 40.0);
        rig.motion(1000.0, 40.0);
        rig.up();

        match &rig.annotations()[0].shape {
            Shape::Polygon { points } => {
                assert_eq!(points.len(), 3);
                let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
                let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
                assert_eq!(max_x, 200.0);
                assert_eq!(min_x, 140.0);
                // Y untouched.
                assert_eq!(points[0].y, 20.0);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_bounds_polygon_drag_saturates() {
        let mut rig = Rig::new(200, 150);
        // Restored sessions can carry geometry outside image bounds.
        let id = rig.ws.alloc_annotation_id();
        rig.ws.current_mut().unwrap().annotations.push(Annotation::new(
            id,
            Shape::Polygon {
                points: vec![
                    Point::new(-10.0, 50.0),
                    Point::new(195.0, 50.0),
                    Point::new(100.0, 140.0),
                ],
            },
            "#fff",
        ));

        rig.down(100.0, 60.0);
        rig.motion(120.0, 60.0);
        rig.up();

        match &rig.annotations()[0].shape {
            Shape::Polygon { points } => {
                assert_eq!(points.len(), 3);
                // Clamp range is inverted (10 > 5): the high bound wins and
                // the whole set shifts by 5, as it always has.
                assert_eq!(points[0], Point::new(-5.0, 50.0));
                assert_eq!(points[1], Point::new(200.0, 50.0));
                assert_eq!(points[2], Point::new(105.0, 140.0));
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_resize_thin_box_at_image_edge() {
        let mut rig = Rig::new(200, 150);
        let id = rig.ws.alloc_annotation_id();
        rig.ws.current_mut().unwrap().annotations.push(Annotation::new(
            id,
            Shape::BBox(BBox::new(199.0, 10.0, 0.5, 50.0)),
            "#fff",
        ));
        rig.ws.selected = Some(id);

        // Less than the minimum width fits right of x=199; the width clamp
        // range is inverted and must saturate to the available room.
        rig.down(199.5, 35.0);
        rig.motion(250.0, 35.0);
        rig.up();

        let b = rig.bbox(0);
        assert!(b.x2() <= 200.0);
        assert_eq!(b, BBox::new(199.0, 10.0, 1.0, 50.0));
    }

    #[test]
    fn test_oversized_box_move_saturates() {
        let mut rig = Rig::new(200, 150);
        let id = rig.ws.alloc_annotation_id();
        rig.ws.current_mut().unwrap().annotations.push(Annotation::new(
            id,
            Shape::BBox(BBox::new(0.0, 0.0, 300.0, 50.0)),
            "#fff",
        ));

        rig.down(50.0, 25.0);
        rig.motion(60.0, 25.0);
        rig.up();

        // Wider than the image: no valid position exists, the high bound
        // (img_w - w = -100) wins regardless of the delta.
        let b = rig.bbox(0);
        assert_eq!((b.x, b.y), (-100.0, 0.0));
        assert_eq!((b.w, b.h), (300.0, 50.0));
    }

    #[test]
    fn test_drag_then_undo_restores_geometry() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();

        rig.down(30.0, 30.0);
        rig.motion(50.0, 50.0);
        rig.up();
        assert_eq!(rig.bbox(0), BBox::new(30.0, 30.0, 50.0, 50.0));

        rig.history.undo(&mut rig.ws);
        assert_eq!(rig.bbox(0), BBox::new(10.0, 10.0, 50.0, 50.0));

        rig.history.redo(&mut rig.ws);
        assert_eq!(rig.bbox(0), BBox::new(30.0, 30.0, 50.0, 50.0));
    }

    #[test]
    fn test_new_shape_takes_active_label_and_color() {
        let mut rig = Rig::new(200, 150);
        let label_id = rig.ws.alloc_label_id();
        rig.ws.labels.push(Label::new(label_id, "car", "#00ff00"));
        rig.ws.active_label = Some(label_id);

        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();

        let ann = &rig.annotations()[0];
        assert_eq!(ann.label_id, Some(label_id));
        assert_eq!(ann.color, "#00ff00");
    }

    #[test]
    fn test_single_session_slot() {
        let mut rig = Rig::new(200, 150);
        rig.down(10.0, 10.0);
        rig.motion(60.0, 60.0);
        rig.up();

        // Start a drag, then press down again mid-drag: the machine keeps
        // the original session.
        rig.down(30.0, 30.0);
        assert!(rig.editor.is_dragging());

        rig.down(150.0, 120.0);
        assert!(rig.editor.is_dragging());
        assert!(rig.editor.box_draft().is_none());

        rig.motion(50.0, 50.0);
        rig.up();
        assert_eq!(rig.bbox(0), BBox::new(30.0, 30.0, 50.0, 50.0));
    }
}
