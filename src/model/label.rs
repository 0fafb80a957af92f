//! Label (class) definitions.

use serde::{Deserialize, Serialize};

/// Unique identifier for a label.
pub type LabelId = u64;

/// A label annotations can reference.
///
/// Labels have a lifecycle independent of annotations; annotations refer to
/// them by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    /// Display color (hex, e.g. `#fb923c`).
    pub color: String,
}

impl Label {
    pub fn new(id: LabelId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}
