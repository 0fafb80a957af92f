//! ZIP packaging of the exported dataset.
//!
//! Archive layout:
//!
//! ```text
//! dataset.yaml
//! meta/classes.txt
//! meta/summary.json
//! images/<original file>
//! labels/<stem>.txt
//! ```

use std::io::{Cursor, Write};

use serde::Serialize;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::export::error::ExportError;
use crate::export::yolo::{classes_txt, dataset_yaml, file_stem, image_lines, label_index_map};
use crate::model::ShapeKind;
use crate::store::Workspace;

/// Contents of `meta/summary.json`.
#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub created_at: String,
    pub chosen_type: &'static str,
    pub total_images: usize,
    pub total_classes: usize,
    pub label_format: &'static str,
}

impl ExportSummary {
    fn new(ws: &Workspace, kind: ShapeKind, created_at: &str) -> Self {
        let (chosen_type, label_format) = match kind {
            ShapeKind::BBox => (
                "bbox",
                "YOLO Detect: class x_center y_center width height (normalized)",
            ),
            ShapeKind::Polygon => (
                "poly",
                "YOLO Seg: class x1 y1 x2 y2 ... (normalized polygon vertices)",
            ),
        };
        Self {
            created_at: created_at.to_string(),
            chosen_type,
            total_images: ws.images.len(),
            total_classes: ws.labels.len(),
            label_format,
        }
    }
}

/// Suggested archive filename for the chosen export kind.
pub fn archive_name(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::BBox => "dataset_bbox.zip",
        ShapeKind::Polygon => "dataset_polygon.zip",
    }
}

/// Build the dataset archive in memory.
///
/// `image_bytes` supplies the original file contents by image name; images
/// with no bytes available still get a label file, just no `images/` entry.
/// A label file is written for every image, empty when nothing of the chosen
/// kind is exportable, so training pipelines see explicit negatives.
pub fn write_dataset_zip(
    ws: &Workspace,
    kind: ShapeKind,
    image_bytes: &[(String, Vec<u8>)],
    created_at: &str,
) -> Result<Vec<u8>, ExportError> {
    if ws.images.is_empty() {
        return Err(ExportError::NoImages);
    }
    if ws.labels.is_empty() {
        return Err(ExportError::NoLabels);
    }

    let class_index = label_index_map(&ws.labels);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file("dataset.yaml", options)?;
    zip.write_all(dataset_yaml(&ws.labels).as_bytes())?;

    zip.start_file("meta/classes.txt", options)?;
    zip.write_all(classes_txt(&ws.labels).as_bytes())?;

    zip.start_file("meta/summary.json", options)?;
    let summary = ExportSummary::new(ws, kind, created_at);
    zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

    for image in &ws.images {
        if let Some((_, bytes)) = image_bytes.iter().find(|(name, _)| *name == image.name) {
            zip.start_file(format!("images/{}", image.name), options)?;
            zip.write_all(bytes)?;
        }

        let lines = image_lines(image, &class_index, kind);
        zip.start_file(format!("labels/{}.txt", file_stem(&image.name)), options)?;
        zip.write_all(lines.join("\n").as_bytes())?;
    }

    let cursor = zip.finish()?;
    log::info!(
        "exported {} images, {} classes ({})",
        ws.images.len(),
        ws.labels.len(),
        archive_name(kind)
    );
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, BBox, Label, Shape};
    use std::io::Read;
    use zip::ZipArchive;

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        let label_id = ws.alloc_label_id();
        ws.labels.push(Label::new(label_id, "car", "#f00"));

        let image_id = ws.add_image("photo.png", 200, 150);
        let ann_id = ws.alloc_annotation_id();
        ws.image_mut(image_id).unwrap().annotations.push(
            Annotation::new(ann_id, Shape::BBox(BBox::new(10.0, 10.0, 90.0, 50.0)), "#f00")
                .with_label(Some(label_id)),
        );
        ws
    }

    fn read_entry(data: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_archive_layout_and_label_content() {
        let ws = workspace();
        let bytes = write_dataset_zip(
            &ws,
            ShapeKind::BBox,
            &[("photo.png".to_string(), vec![1, 2, 3])],
            "2026-08-30T00:00:00Z",
        )
        .unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        drop(archive);
        assert!(names.contains(&"dataset.yaml".to_string()));
        assert!(names.contains(&"meta/classes.txt".to_string()));
        assert!(names.contains(&"meta/summary.json".to_string()));
        assert!(names.contains(&"images/photo.png".to_string()));
        assert!(names.contains(&"labels/photo.txt".to_string()));

        assert_eq!(
            read_entry(&bytes, "labels/photo.txt"),
            "0 0.275000 0.233333 0.450000 0.333333"
        );
        assert_eq!(read_entry(&bytes, "meta/classes.txt"), "car");
    }

    #[test]
    fn test_summary_fields() {
        let ws = workspace();
        let bytes = write_dataset_zip(&ws, ShapeKind::Polygon, &[], "t0").unwrap();

        let summary: serde_json::Value =
            serde_json::from_str(&read_entry(&bytes, "meta/summary.json")).unwrap();
        assert_eq!(summary["chosen_type"], "poly");
        assert_eq!(summary["total_images"], 1);
        assert_eq!(summary["total_classes"], 1);
        assert_eq!(summary["created_at"], "t0");
    }

    #[test]
    fn test_missing_image_bytes_still_writes_labels() {
        let ws = workspace();
        let bytes = write_dataset_zip(&ws, ShapeKind::BBox, &[], "t0").unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert!(!names.iter().any(|n| n.starts_with("images/")));
        assert!(names.contains(&"labels/photo.txt".to_string()));
    }

    #[test]
    fn test_empty_workspace_rejected() {
        let ws = Workspace::new();
        assert!(matches!(
            write_dataset_zip(&ws, ShapeKind::BBox, &[], "t0"),
            Err(ExportError::NoImages)
        ));

        let mut with_image = Workspace::new();
        with_image.add_image("a.png", 10, 10);
        assert!(matches!(
            write_dataset_zip(&with_image, ShapeKind::BBox, &[], "t0"),
            Err(ExportError::NoLabels)
        ));
    }

    #[test]
    fn test_archive_names() {
        assert_eq!(archive_name(ShapeKind::BBox), "dataset_bbox.zip");
        assert_eq!(archive_name(ShapeKind::Polygon), "dataset_polygon.zip");
    }
}
