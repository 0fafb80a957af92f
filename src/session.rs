//! Session persistence: snapshot, restore, and the debounced save hook.
//!
//! A snapshot captures labels, flags, and per-image annotations keyed by
//! `name||width||height`. Pixel data is never stored; on restore the
//! annotations wait in a pending pool and re-attach when an image with a
//! matching key is imported again. A dimension change invalidates the key, so
//! stale geometry is never applied to a resized file.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::model::{Annotation, ImageDoc, Label, LabelId};
use crate::store::Workspace;

/// Current snapshot schema version.
const SNAPSHOT_VERSION: u32 = 1;

/// Serialized annotations of one image, keyed by name and dimensions rather
/// than by the transient image id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub annotations: Vec<Annotation>,
}

/// A complete serializable session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub labels: Vec<Label>,
    #[serde(default)]
    pub active_label: Option<LabelId>,
    #[serde(default)]
    pub hidden_labels: Vec<LabelId>,
    #[serde(default)]
    pub locked_labels: Vec<LabelId>,
    pub images: Vec<ImageRecord>,
}

/// Errors from snapshot encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// The pending-pool key: an image is the "same" image iff name and both
/// dimensions match.
fn image_key(name: &str, width: u32, height: u32) -> String {
    format!("{name}||{width}||{height}")
}

impl SessionSnapshot {
    /// Capture the current workspace. Images with no annotations are skipped;
    /// there is nothing to restore for them.
    pub fn capture(ws: &Workspace) -> Self {
        let mut hidden_labels: Vec<LabelId> = ws.label_hidden.iter().copied().collect();
        let mut locked_labels: Vec<LabelId> = ws.label_locked.iter().copied().collect();
        hidden_labels.sort_unstable();
        locked_labels.sort_unstable();

        Self {
            version: SNAPSHOT_VERSION,
            labels: ws.labels.clone(),
            active_label: ws.active_label,
            hidden_labels,
            locked_labels,
            images: ws
                .images
                .iter()
                .filter(|i| !i.annotations.is_empty())
                .map(|i| ImageRecord {
                    name: i.name.clone(),
                    width: i.width,
                    height: i.height,
                    annotations: i.annotations.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, SessionError> {
        let snapshot: Self = serde_json::from_str(data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

/// Holds restored annotations until their images are imported again.
#[derive(Debug, Clone, Default)]
pub struct SessionRestore {
    pending: HashMap<String, Vec<Annotation>>,
}

impl SessionRestore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a snapshot's labels and flags to the workspace and queue its
    /// annotations for re-attachment.
    pub fn restore(&mut self, ws: &mut Workspace, snapshot: SessionSnapshot) {
        for label in &snapshot.labels {
            if ws.label(label.id).is_none() {
                ws.labels.push(label.clone());
            }
            ws.reserve_label_id(label.id);
        }
        ws.active_label = snapshot
            .active_label
            .filter(|id| ws.label(*id).is_some());
        ws.label_hidden.extend(snapshot.hidden_labels.iter().copied());
        ws.label_locked.extend(snapshot.locked_labels.iter().copied());

        let mut count = 0;
        for record in snapshot.images {
            count += record.annotations.len();
            self.pending
                .entry(image_key(&record.name, record.width, record.height))
                .or_default()
                .extend(record.annotations);
        }
        log::info!(
            "session restored: {} labels, {count} pending annotations",
            ws.labels.len()
        );

        // Re-attach to anything already imported.
        let ids: Vec<_> = ws.images.iter().map(|i| i.id).collect();
        for id in ids {
            if let Some(image) = ws.image(id) {
                let key = image_key(&image.name, image.width, image.height);
                self.attach(ws, key);
            }
        }
    }

    /// Try to attach pending annotations to a freshly imported image. Called
    /// by the import path after [`Workspace::add_image`].
    pub fn try_apply(&mut self, ws: &mut Workspace, image: &ImageDoc) {
        self.attach(ws, image_key(&image.name, image.width, image.height));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn attach(&mut self, ws: &mut Workspace, key: String) {
        let Some(annotations) = self.pending.remove(&key) else {
            return;
        };
        // Restored ids must stay unique against future allocations.
        for ann in &annotations {
            ws.reserve_annotation_id(ann.id);
        }
        let Some(image) = ws.images.iter_mut().find(|i| {
            image_key(&i.name, i.width, i.height) == key
        }) else {
            self.pending.insert(key, annotations);
            return;
        };
        log::debug!(
            "session: attached {} annotations to {:?}",
            annotations.len(),
            image.name
        );
        image.annotations.extend(annotations);
    }
}

/// Debounced save scheduling.
///
/// Edits mark the hook dirty; the host polls [`AutoSave::should_save`] each
/// frame and persists a fresh [`SessionSnapshot`] when it returns true.
#[derive(Debug)]
pub struct AutoSave {
    debounce_delay: Duration,
    last_change: Option<Instant>,
    dirty: bool,
}

impl AutoSave {
    /// Default debounce delay between the last edit and the save.
    pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self {
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            last_change: None,
            dirty: false,
        }
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Mark that a change occurred. Restarts the debounce window.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True once the debounce window after the last change has elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        self.last_change
            .is_some_and(|t| t.elapsed() >= self.debounce_delay)
    }

    /// Mark that a save completed.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.last_change = None;
    }
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new()
    }
}
