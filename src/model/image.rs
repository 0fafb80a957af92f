//! Per-image annotation records.

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, AnnotationId};

/// Unique identifier for an imported image.
pub type ImageId = u64;

/// An imported image and its ordered annotations.
///
/// Pixel data lives with the image provider; the engine only needs the
/// dimensions for clamping and export normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDoc {
    pub id: ImageId,
    /// Original file name, used as the session/export key together with the
    /// dimensions.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub annotations: Vec<Annotation>,
}

impl ImageDoc {
    pub fn new(id: ImageId, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            annotations: Vec::new(),
        }
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub fn annotation_index(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }
}
