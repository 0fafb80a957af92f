//! Undo/redo history for workspace mutations.
//!
//! Every user-reversible change is a [`Command`] holding full before/after
//! snapshots of the entities it touches. Commands apply and revert through
//! id-based lookups and silently skip entities that no longer exist, so a
//! redo after an unrelated deletion degrades to a no-op instead of failing.

use crate::model::{Annotation, AnnotationId, ImageDoc, ImageId, Label, LabelId};
use crate::store::Workspace;

/// A reversible unit of workspace mutation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Append an annotation to an image and select it.
    AddAnnotation {
        image_id: ImageId,
        annotation: Annotation,
    },
    /// Remove an annotation; `index` restores its z-order on undo.
    RemoveAnnotation {
        image_id: ImageId,
        index: usize,
        annotation: Annotation,
    },
    /// Replace an annotation wholesale (geometry edits, flag toggles).
    ReplaceAnnotation {
        image_id: ImageId,
        before: Annotation,
        after: Annotation,
    },
    /// Add a label and make it active.
    AddLabel { label: Label },
    /// Remove a label, remembering its position and flag state for undo.
    /// Annotations referencing it are left untouched.
    RemoveLabel {
        index: usize,
        label: Label,
        was_active: bool,
        was_hidden: bool,
        was_locked: bool,
    },
    /// Remove every annotation on one image that references a label.
    RemoveLabelGroup {
        image_id: ImageId,
        label_id: LabelId,
        /// Removed annotations with their original indices, ascending.
        removed: Vec<(usize, Annotation)>,
    },
    /// Toggle group visibility for a label. Self-inverse.
    ToggleLabelHidden { label_id: LabelId },
    /// Toggle group lock for a label. Self-inverse.
    ToggleLabelLocked { label_id: LabelId },
    /// Remove an image record; `index` restores list order on undo.
    RemoveImage { index: usize, image: ImageDoc },
}

impl Command {
    /// Build a label creation command with a freshly allocated id.
    pub fn add_label(
        ws: &mut Workspace,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Command {
        let id = ws.alloc_label_id();
        Command::AddLabel {
            label: Label::new(id, name, color),
        }
    }

    /// Build a label deletion command, capturing flag state for undo.
    /// Returns None for an unknown id.
    pub fn remove_label(ws: &Workspace, label_id: LabelId) -> Option<Command> {
        let index = ws.label_index(label_id)?;
        Some(Command::RemoveLabel {
            index,
            label: ws.labels[index].clone(),
            was_active: ws.active_label == Some(label_id),
            was_hidden: ws.label_hidden.contains(&label_id),
            was_locked: ws.label_locked.contains(&label_id),
        })
    }

    /// Build a command removing every annotation on `image_id` that
    /// references `label_id`. Returns None when the label is locked or
    /// nothing matches.
    pub fn remove_label_group(
        ws: &Workspace,
        image_id: ImageId,
        label_id: LabelId,
    ) -> Option<Command> {
        if ws.label_locked.contains(&label_id) {
            log::debug!("label group delete skipped: label {label_id} is locked");
            return None;
        }
        let image = ws.image(image_id)?;
        let removed: Vec<(usize, Annotation)> = image
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.label_id == Some(label_id))
            .map(|(index, a)| (index, a.clone()))
            .collect();
        if removed.is_empty() {
            return None;
        }
        Some(Command::RemoveLabelGroup {
            image_id,
            label_id,
            removed,
        })
    }

    /// Build an image removal command. Returns None for an unknown id.
    pub fn remove_image(ws: &Workspace, image_id: ImageId) -> Option<Command> {
        let index = ws.image_index(image_id)?;
        Some(Command::RemoveImage {
            index,
            image: ws.images[index].clone(),
        })
    }

    /// Human-readable description, for logging.
    pub fn description(&self) -> &'static str {
        match self {
            Command::AddAnnotation { .. } => "add annotation",
            Command::RemoveAnnotation { .. } => "delete annotation",
            Command::ReplaceAnnotation { .. } => "edit annotation",
            Command::AddLabel { .. } => "add label",
            Command::RemoveLabel { .. } => "delete label",
            Command::RemoveLabelGroup { .. } => "delete label group",
            Command::ToggleLabelHidden { .. } => "toggle label visibility",
            Command::ToggleLabelLocked { .. } => "toggle label lock",
            Command::RemoveImage { .. } => "remove image",
        }
    }

    /// Apply the command's effect. Idempotent over already-applied state.
    pub fn apply(&self, ws: &mut Workspace) {
        match self {
            Command::AddAnnotation {
                image_id,
                annotation,
            } => {
                if let Some(image) = ws.image_mut(*image_id) {
                    if image.annotation(annotation.id).is_none() {
                        image.annotations.push(annotation.clone());
                    }
                    ws.selected = Some(annotation.id);
                }
            }
            Command::RemoveAnnotation {
                image_id,
                annotation,
                ..
            } => {
                remove_annotation(ws, *image_id, annotation.id);
            }
            Command::ReplaceAnnotation {
                image_id, after, ..
            } => {
                replace_annotation(ws, *image_id, after);
            }
            Command::AddLabel { label } => {
                if ws.label(label.id).is_none() {
                    ws.labels.push(label.clone());
                }
                ws.active_label = Some(label.id);
            }
            Command::RemoveLabel { label, .. } => {
                if let Some(index) = ws.label_index(label.id) {
                    ws.labels.remove(index);
                }
                if ws.active_label == Some(label.id) {
                    ws.active_label = None;
                }
                ws.label_hidden.remove(&label.id);
                ws.label_locked.remove(&label.id);
            }
            Command::RemoveLabelGroup {
                image_id, label_id, ..
            } => {
                if let Some(index) = ws.image_index(*image_id) {
                    ws.images[index]
                        .annotations
                        .retain(|a| a.label_id != Some(*label_id));
                    if let Some(sel) = ws.selected {
                        if ws.images[index].annotation(sel).is_none() {
                            ws.selected = None;
                        }
                    }
                }
            }
            Command::ToggleLabelHidden { label_id } => {
                if !ws.label_hidden.remove(label_id) {
                    ws.label_hidden.insert(*label_id);
                }
            }
            Command::ToggleLabelLocked { label_id } => {
                if !ws.label_locked.remove(label_id) {
                    ws.label_locked.insert(*label_id);
                }
            }
            Command::RemoveImage { image, .. } => {
                if let Some(index) = ws.image_index(image.id) {
                    ws.images.remove(index);
                }
                if ws.current_image == Some(image.id) {
                    ws.current_image = ws.images.first().map(|i| i.id);
                    ws.selected = None;
                }
            }
        }
    }

    /// Reverse the command's effect. Idempotent over already-reverted state.
    pub fn revert(&self, ws: &mut Workspace) {
        match self {
            Command::AddAnnotation {
                image_id,
                annotation,
            } => {
                remove_annotation(ws, *image_id, annotation.id);
            }
            Command::RemoveAnnotation {
                image_id,
                index,
                annotation,
            } => {
                if let Some(image) = ws.image_mut(*image_id) {
                    if image.annotation(annotation.id).is_none() {
                        let at = (*index).min(image.annotations.len());
                        image.annotations.insert(at, annotation.clone());
                    }
                    ws.selected = Some(annotation.id);
                }
            }
            Command::ReplaceAnnotation {
                image_id, before, ..
            } => {
                replace_annotation(ws, *image_id, before);
            }
            Command::AddLabel { label } => {
                if let Some(index) = ws.label_index(label.id) {
                    ws.labels.remove(index);
                }
                if ws.active_label == Some(label.id) {
                    ws.active_label = None;
                }
                ws.label_hidden.remove(&label.id);
                ws.label_locked.remove(&label.id);
            }
            Command::RemoveLabel {
                index,
                label,
                was_active,
                was_hidden,
                was_locked,
            } => {
                if ws.label(label.id).is_none() {
                    let at = (*index).min(ws.labels.len());
                    ws.labels.insert(at, label.clone());
                }
                if *was_active {
                    ws.active_label = Some(label.id);
                }
                if *was_hidden {
                    ws.label_hidden.insert(label.id);
                }
                if *was_locked {
                    ws.label_locked.insert(label.id);
                }
            }
            Command::RemoveLabelGroup {
                image_id, removed, ..
            } => {
                if let Some(image) = ws.image_mut(*image_id) {
                    for (index, ann) in removed {
                        if image.annotation(ann.id).is_none() {
                            let at = (*index).min(image.annotations.len());
                            image.annotations.insert(at, ann.clone());
                        }
                    }
                }
            }
            // Set toggles are their own inverse.
            Command::ToggleLabelHidden { .. } | Command::ToggleLabelLocked { .. } => {
                self.apply(ws);
            }
            Command::RemoveImage { index, image } => {
                if ws.image(image.id).is_none() {
                    let at = (*index).min(ws.images.len());
                    ws.images.insert(at, image.clone());
                }
                if ws.current_image.is_none() {
                    ws.current_image = Some(image.id);
                }
            }
        }
    }
}

fn remove_annotation(ws: &mut Workspace, image_id: ImageId, id: AnnotationId) {
    if let Some(image) = ws.image_mut(image_id) {
        if let Some(index) = image.annotation_index(id) {
            image.annotations.remove(index);
        }
    }
    if ws.selected == Some(id) {
        ws.selected = None;
    }
}

fn replace_annotation(ws: &mut Workspace, image_id: ImageId, snapshot: &Annotation) {
    if let Some(image) = ws.image_mut(image_id) {
        if let Some(ann) = image.annotation_mut(snapshot.id) {
            *ann = snapshot.clone();
        }
    }
}

/// The undo/redo history: two stacks of committed commands.
///
/// Committing pushes to the undo stack and clears the redo stack. Both stacks
/// are unbounded; commands hold full snapshots, which is fine at the scale of
/// dozens-to-hundreds of annotations.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Set by every commit/undo/redo; the persistence layer polls and clears
    /// it to drive the debounced save hook.
    dirty: bool,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and record it. This is the only path that persists
    /// a change.
    pub fn commit(&mut self, ws: &mut Workspace, command: Command) {
        log::debug!("commit: {}", command.description());
        command.apply(ws);
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.dirty = true;
    }

    /// Undo the most recent command. Returns false if there was nothing to
    /// undo.
    pub fn undo(&mut self, ws: &mut Workspace) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("undo: {}", command.description());
        command.revert(ws);
        self.redo_stack.push(command);
        self.dirty = true;
        true
    }

    /// Redo the most recently undone command. Returns false if the redo
    /// stack is empty.
    pub fn redo(&mut self, ws: &mut Workspace) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("redo: {}", command.description());
        command.apply(ws);
        self.undo_stack.push(command);
        self.dirty = true;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// True if any history operation ran since the last [`take_dirty`] call.
    ///
    /// [`take_dirty`]: CommandHistory::take_dirty
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the dirty flag. The save hook calls this once per poll.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drop all history. Used by workspace reset.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
