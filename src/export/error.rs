//! Error types for dataset export.

use thiserror::Error;

/// Errors that can occur while building an export archive.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no images to export")]
    NoImages,

    #[error("no labels defined; add labels before exporting")]
    NoLabels,

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
