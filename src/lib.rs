//! vannot - Vector Annotation Engine
//!
//! An interactive editing engine for image annotation: axis-aligned boxes
//! and polygons drawn over raster images, label management, command-based
//! undo/redo, session persistence, and YOLO dataset export.
//!
//! The engine is headless: it consumes pointer and keyboard events in canvas
//! coordinates and exposes the resulting state for whatever surface the host
//! renders with.

pub mod constants;
pub mod editor;
pub mod export;
pub mod history;
pub mod hit;
pub mod keys;
pub mod loader;
pub mod model;
pub mod session;
pub mod store;
pub mod view;

pub use editor::{Editor, ToolMode};
pub use history::{Command, CommandHistory};
pub use hit::{Handle, HitTarget, hit_test};
pub use model::{
    Annotation, AnnotationId, BBox, ImageDoc, ImageId, Label, LabelId, Point, Shape, ShapeKind,
};
pub use session::{AutoSave, SessionRestore, SessionSnapshot};
pub use store::Workspace;
pub use view::ViewTransform;
