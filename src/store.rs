//! Workspace state: images, labels, flags, and derived queries.
//!
//! The workspace is pure data plus lookups. Structural changes that should be
//! user-reversible go through [`crate::history`]; the only sanctioned direct
//! mutation is the live geometry update during an in-progress drag, which the
//! editor reconciles into a single command at drag end.

use std::collections::HashSet;

use crate::constants::DEFAULT_COLOR;
use crate::model::{Annotation, AnnotationId, ImageDoc, ImageId, Label, LabelId};

/// All persistent-ish editing state for one session.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub images: Vec<ImageDoc>,
    pub labels: Vec<Label>,
    /// Labels whose annotations are hidden as a group.
    pub label_hidden: HashSet<LabelId>,
    /// Labels whose annotations are locked as a group. Label lock always
    /// overrides per-annotation unlock.
    pub label_locked: HashSet<LabelId>,
    pub current_image: Option<ImageId>,
    pub active_label: Option<LabelId>,
    pub selected: Option<AnnotationId>,

    next_image_id: ImageId,
    next_label_id: LabelId,
    next_annotation_id: AnnotationId,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Id allocation
    // ========================================================================

    pub fn alloc_image_id(&mut self) -> ImageId {
        self.next_image_id += 1;
        self.next_image_id
    }

    pub fn alloc_label_id(&mut self) -> LabelId {
        self.next_label_id += 1;
        self.next_label_id
    }

    pub fn alloc_annotation_id(&mut self) -> AnnotationId {
        self.next_annotation_id += 1;
        self.next_annotation_id
    }

    /// Make sure future annotation ids won't collide with `id`. Used when
    /// adopting annotations restored from a saved session.
    pub fn reserve_annotation_id(&mut self, id: AnnotationId) {
        self.next_annotation_id = self.next_annotation_id.max(id);
    }

    /// Label counterpart of [`Workspace::reserve_annotation_id`].
    pub fn reserve_label_id(&mut self, id: LabelId) {
        self.next_label_id = self.next_label_id.max(id);
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Register a decoded image and return its id.
    pub fn add_image(&mut self, name: impl Into<String>, width: u32, height: u32) -> ImageId {
        let id = self.alloc_image_id();
        self.images.push(ImageDoc::new(id, name, width, height));
        id
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageDoc> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn image_mut(&mut self, id: ImageId) -> Option<&mut ImageDoc> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    pub fn image_index(&self, id: ImageId) -> Option<usize> {
        self.images.iter().position(|i| i.id == id)
    }

    pub fn current(&self) -> Option<&ImageDoc> {
        self.current_image.and_then(|id| self.image(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut ImageDoc> {
        let id = self.current_image?;
        self.image_mut(id)
    }

    /// Switch the current image, clearing the selection.
    ///
    /// The caller is responsible for resetting the view transform and any
    /// in-progress draw session.
    pub fn select_image(&mut self, id: ImageId) {
        if self.image(id).is_some() {
            self.current_image = Some(id);
            self.selected = None;
        }
    }

    // ========================================================================
    // Labels
    // ========================================================================

    /// Resolve a label id. Returns None for stale ids (deleted labels).
    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn label_index(&self, id: LabelId) -> Option<usize> {
        self.labels.iter().position(|l| l.id == id)
    }

    /// Resolve an annotation's label. None means "unlabeled" (no reference,
    /// or the referenced label was deleted).
    pub fn label_of(&self, ann: &Annotation) -> Option<&Label> {
        ann.label_id.and_then(|id| self.label(id))
    }

    pub fn active_label(&self) -> Option<&Label> {
        self.active_label.and_then(|id| self.label(id))
    }

    /// Stroke color for newly drawn shapes: the active label's color, or the
    /// default accent.
    pub fn active_color(&self) -> &str {
        self.active_label()
            .map(|l| l.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    // ========================================================================
    // Effective flags
    // ========================================================================

    pub fn is_label_hidden(&self, id: Option<LabelId>) -> bool {
        id.is_some_and(|id| self.label_hidden.contains(&id))
    }

    pub fn is_label_locked(&self, id: Option<LabelId>) -> bool {
        id.is_some_and(|id| self.label_locked.contains(&id))
    }

    /// Effective visibility: own flag OR the label's group flag.
    pub fn effective_hidden(&self, ann: &Annotation) -> bool {
        ann.hidden || self.is_label_hidden(ann.label_id)
    }

    /// Effective lock: own flag OR the label's group flag.
    pub fn effective_locked(&self, ann: &Annotation) -> bool {
        ann.locked || self.is_label_locked(ann.label_id)
    }

    /// The currently selected annotation on the current image, if any.
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        let id = self.selected?;
        self.current()?.annotation(id)
    }

    /// Drop everything: images, labels, flags, selection, id counters.
    pub fn reset(&mut self) {
        log::info!(
            "Workspace reset: dropping {} images and {} labels",
            self.images.len(),
            self.labels.len()
        );
        *self = Self::default();
    }
}
