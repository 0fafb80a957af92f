//! Decoding imported raster images (PNG, JPEG, BMP, TIFF, WebP).
//!
//! The engine keeps only dimensions in the workspace; the decoded RGBA
//! pixels go to whatever surface the host renders with.

use thiserror::Error;

/// Errors produced while decoding an imported file.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("unrecognized image format")]
    UnrecognizedFormat,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded image ready for display and registration.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major.
    pub pixels: Vec<u8>,
}

/// Check common raster magic bytes before handing data to the decoder.
pub fn can_decode(data: &[u8]) -> bool {
    if data.len() < 8 {
        return false;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return true;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // BMP: 42 4D (BM)
    if data.starts_with(&[0x42, 0x4D]) {
        return true;
    }

    // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return true;
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(&[0x52, 0x49, 0x46, 0x46]) && &data[8..12] == b"WEBP" {
        return true;
    }

    false
}

/// Decode an imported file into RGBA8 pixels.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, LoaderError> {
    if !can_decode(data) {
        return Err(LoaderError::UnrecognizedFormat);
    }

    let img = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = (img.width(), img.height());
    log::trace!("decoded {width}x{height} image ({} bytes in)", data.len());

    Ok(DecodedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}
