/// Image file handling
///
/// This module handles:
/// - Picking image files and loading their bytes (loader.rs)
/// - Generating project thumbnails (thumbnail.rs)
/// - Rendering filter previews for the Adjust/Filters tools (preview.rs)
///
/// Nothing here changes the bytes that are sent to the generation endpoint.
use iced::widget::image::Handle;
use thiserror::Error;

pub mod loader;
pub mod preview;
pub mod thumbnail;

/// Errors from loading, decoding or saving images
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("{0} is not a supported image file")]
    UnsupportedFormat(String),

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("background task failed: {0}")]
    Join(String),
}

/// A decoded RGBA frame ready for display
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

impl PreviewFrame {
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            handle: Handle::from_rgba(width, height, image.into_raw()),
        }
    }
}
