//! Dataset export.
//!
//! Produces YOLO label files (detection or segmentation, depending on the
//! chosen shape kind) and packages them with the source images into a ZIP
//! archive ready for training.

mod dataset;
mod error;
mod yolo;

pub use dataset::{ExportSummary, archive_name, write_dataset_zip};
pub use error::ExportError;
pub use yolo::{bbox_line, classes_txt, dataset_yaml, image_lines, label_index_map, polygon_line};
