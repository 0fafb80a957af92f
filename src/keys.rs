//! Keyboard shortcut handling.
//!
//! Maps raw key input plus modifiers onto editor actions and applies them.
//! The mapping follows the usual conventions: Ctrl (or Cmd) + Z undoes,
//! adding Shift redoes, Ctrl+Y also redoes, Delete or Backspace removes the
//! selection, and Escape clears the active label.

use crate::history::{Command, CommandHistory};
use crate::store::Workspace;

/// Keys the engine reacts to. Anything else is ignored by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Z,
    Y,
}

/// A key event with its modifier state. `ctrl` covers Cmd on macOS; the host
/// folds the platform modifier in before calling [`action_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Editor-level actions keyboard input can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    ClearActiveLabel,
    Undo,
    Redo,
    DeleteSelected,
}

/// Translate a key event into an action, or None if unbound.
pub fn action_for(input: KeyInput) -> Option<EditorAction> {
    match input.key {
        Key::Escape => Some(EditorAction::ClearActiveLabel),
        Key::Z if input.ctrl && input.shift => Some(EditorAction::Redo),
        Key::Z if input.ctrl => Some(EditorAction::Undo),
        Key::Y if input.ctrl => Some(EditorAction::Redo),
        Key::Delete | Key::Backspace => Some(EditorAction::DeleteSelected),
        _ => None,
    }
}

/// Execute an action against the workspace and history.
///
/// Deleting a selected annotation that is locked (directly or through its
/// label) does nothing; the lock protects against keyboard slips as much as
/// against drags.
pub fn apply_action(ws: &mut Workspace, history: &mut CommandHistory, action: EditorAction) {
    match action {
        EditorAction::ClearActiveLabel => {
            ws.active_label = None;
        }
        EditorAction::Undo => {
            history.undo(ws);
        }
        EditorAction::Redo => {
            history.redo(ws);
        }
        EditorAction::DeleteSelected => {
            let Some(id) = ws.selected else {
                return;
            };
            let Some(image) = ws.current() else {
                return;
            };
            let image_id = image.id;
            let Some(index) = image.annotation_index(id) else {
                return;
            };
            let annotation = image.annotations[index].clone();
            if ws.effective_locked(&annotation) {
                log::debug!("delete skipped: annotation {id} is locked");
                return;
            }
            history.commit(
                ws,
                Command::RemoveAnnotation {
                    image_id,
                    index,
                    annotation,
                },
            );
        }
    }
}
