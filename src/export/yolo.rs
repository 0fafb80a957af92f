//! YOLO label file generation.
//!
//! Detection lines are `class x_center y_center width height`; segmentation
//! lines are `class x1 y1 x2 y2 ...`. All coordinates are normalized to the
//! image size and clamped into `[0, 1]`, printed with six decimals.

use std::collections::HashMap;

use crate::constants::MIN_POLYGON_VERTICES;
use crate::model::{BBox, ImageDoc, Label, LabelId, Point, Shape, ShapeKind};

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Detection line for one box.
pub fn bbox_line(b: &BBox, img_w: f32, img_h: f32, class_index: usize) -> String {
    let cx = (b.x + b.w / 2.0) / img_w;
    let cy = (b.y + b.h / 2.0) / img_h;
    let w = b.w / img_w;
    let h = b.h / img_h;
    format!(
        "{class_index} {:.6} {:.6} {:.6} {:.6}",
        clamp01(cx),
        clamp01(cy),
        clamp01(w),
        clamp01(h)
    )
}

/// Segmentation line for one polygon. Each coordinate is clamped
/// independently.
pub fn polygon_line(points: &[Point], img_w: f32, img_h: f32, class_index: usize) -> String {
    let mut line = class_index.to_string();
    for p in points {
        line.push_str(&format!(
            " {:.6} {:.6}",
            clamp01(p.x / img_w),
            clamp01(p.y / img_h)
        ));
    }
    line
}

/// Map label ids to class indices: the position in the label list defines
/// the class number.
pub fn label_index_map(labels: &[Label]) -> HashMap<LabelId, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| (label.id, index))
        .collect()
}

/// Label file lines for one image, restricted to `kind`.
///
/// Annotations whose label cannot be resolved to a class are skipped, as are
/// degenerate shapes (zero-area boxes, polygons below the vertex minimum).
pub fn image_lines(
    image: &ImageDoc,
    class_index: &HashMap<LabelId, usize>,
    kind: ShapeKind,
) -> Vec<String> {
    let (img_w, img_h) = (image.width as f32, image.height as f32);
    let mut lines = Vec::new();

    for ann in &image.annotations {
        if ann.shape.kind() != kind {
            continue;
        }
        let Some(&index) = ann.label_id.as_ref().and_then(|id| class_index.get(id)) else {
            log::debug!("export: skipping annotation {} (unresolvable label)", ann.id);
            continue;
        };

        match &ann.shape {
            Shape::BBox(b) => {
                if b.w <= 0.0 || b.h <= 0.0 {
                    continue;
                }
                lines.push(bbox_line(b, img_w, img_h, index));
            }
            Shape::Polygon { points } => {
                if points.len() < MIN_POLYGON_VERTICES {
                    continue;
                }
                lines.push(polygon_line(points, img_w, img_h, index));
            }
        }
    }
    lines
}

/// One class name per line, in class-index order.
pub fn classes_txt(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ultralytics-style `dataset.yaml` pointing at the archive's own layout.
pub fn dataset_yaml(labels: &[Label]) -> String {
    let mut yaml = String::from("path: .\ntrain: images\nval: images\n\nnames:\n");
    for (index, label) in labels.iter().enumerate() {
        yaml.push_str(&format!("  {index}: {}\n", label.name));
    }
    yaml
}

/// Filename without its last extension, for `labels/<stem>.txt`.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(index) => &name[..index],
    }
}
