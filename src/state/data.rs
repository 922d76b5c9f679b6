/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the generation client, the media helpers and the UI layer.
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::edit::ToolKind;
use crate::media::{MediaError, PreviewFrame};

/// Mime type assumed when an image carries no usable type information
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Mime type every generated result is tagged with
pub const RESULT_MIME_TYPE: &str = "image/png";

/// Encoded image bytes plus the mime type they were tagged with
///
/// The bytes are never decoded or re-encoded on the editing path, they are
/// forwarded to the generation endpoint as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Wrap bytes read from disk, sniffing the mime type from magic bytes
    pub fn from_file_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE);
        Self::new(bytes, mime_type)
    }

    /// Parse a `data:image/...;base64,` URI.
    ///
    /// A missing or non-image prefix falls back to `image/jpeg`; the payload is
    /// everything after the first comma, or the whole string if there is none.
    pub fn from_data_uri(uri: &str) -> Result<Self, MediaError> {
        let uri = uri.trim();
        let mime_type = data_uri_mime(uri).unwrap_or(DEFAULT_MIME_TYPE);
        let payload = match uri.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => payload,
            _ => uri,
        };

        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|e| MediaError::InvalidDataUri(e.to_string()))?;

        Ok(Self::new(bytes, mime_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 payload without any data URI prefix
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension matching the mime type, used when saving exports
    pub fn extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("jpg")
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Extract `image/<subtype>` from a data URI prefix, if it has a valid one
fn data_uri_mime(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, _) = rest.split_once(";base64,")?;
    let subtype = mime.strip_prefix("image/")?;

    let valid = !subtype.is_empty()
        && subtype.chars().all(|c| c.is_ascii_alphabetic() || c == '+');
    valid.then_some(mime)
}

/// Label shown on a project card, derived from the tool it was started with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectCategory {
    New,
    Edit,
    Enhance,
    Morph,
    Cleanup,
    Style,
}

impl ProjectCategory {
    pub fn label(self) -> &'static str {
        match self {
            ProjectCategory::New => "New",
            ProjectCategory::Edit => "Edit",
            ProjectCategory::Enhance => "Enhance",
            ProjectCategory::Morph => "Morph",
            ProjectCategory::Cleanup => "Cleanup",
            ProjectCategory::Style => "Style",
        }
    }

    /// Category of a project started from `tool`
    pub fn for_tool(tool: ToolKind) -> Self {
        match tool {
            ToolKind::BackgroundRemoval | ToolKind::Eraser | ToolKind::Retouch => {
                ProjectCategory::Cleanup
            }
            ToolKind::Upscale => ProjectCategory::Enhance,
            ToolKind::Morph => ProjectCategory::Morph,
            ToolKind::Style => ProjectCategory::Style,
            ToolKind::Magic | ToolKind::Filters | ToolKind::Adjust => ProjectCategory::New,
        }
    }
}

/// Represents a single project in the session library
#[derive(Debug, Clone)]
pub struct Project {
    /// Unique id within this session
    pub id: u64,
    pub title: String,
    /// Human-readable creation stamp (e.g., "05/03/2023, 1:30 PM")
    pub created_at: String,
    /// Full image, replaced when an edited version is committed
    pub image: EncodedImage,
    /// Small decoded frame for the home grid (None until generated)
    pub thumbnail: Option<PreviewFrame>,
    pub category: ProjectCategory,
}
