//! Core data model: annotations, labels, and image records.

mod annotation;
mod image;
mod label;

pub use annotation::{Annotation, AnnotationId, BBox, Point, Shape, ShapeKind};
pub use image::{ImageDoc, ImageId};
pub use label::{Label, LabelId};
