/// Image file loading and saving
///
/// Files enter the app through the native picker and are kept as encoded
/// bytes. The mime type is sniffed from the file's magic bytes.
use std::path::{Path, PathBuf};

use rfd::AsyncFileDialog;
use tracing::{info, warn};

use super::MediaError;
use crate::state::data::EncodedImage;

/// Extensions offered in the open dialog
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Show the native picker and load the chosen image.
///
/// Returns None when the user cancels the dialog.
pub async fn pick_image(title: &'static str) -> Option<Result<EncodedImage, MediaError>> {
    let handle = AsyncFileDialog::new()
        .set_title(title)
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
        .await?;

    Some(load_image(handle.path()).await)
}

/// Read an image file from disk
pub async fn load_image(path: &Path) -> Result<EncodedImage, MediaError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| MediaError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if image::guess_format(&bytes).is_err() {
        warn!(path = %path.display(), "picked file is not a recognized image");
        return Err(MediaError::UnsupportedFormat(path.display().to_string()));
    }

    let image = EncodedImage::from_file_bytes(bytes);
    info!(
        path = %path.display(),
        mime = image.mime_type(),
        bytes = image.len(),
        "loaded image"
    );
    Ok(image)
}

/// Ask for a destination and write the image bytes unchanged.
///
/// Returns None when the user cancels the dialog.
pub async fn save_image(image: EncodedImage, stem: String) -> Option<Result<PathBuf, MediaError>> {
    let extension = image.extension();
    let handle = AsyncFileDialog::new()
        .set_title("Save Image")
        .set_file_name(format!("{stem}.{extension}"))
        .add_filter("Image", &[extension])
        .save_file()
        .await?;

    Some(write_image(handle.path().to_path_buf(), &image).await)
}

/// Write the image bytes to `path`
pub async fn write_image(path: PathBuf, image: &EncodedImage) -> Result<PathBuf, MediaError> {
    tokio::fs::write(&path, image.bytes())
        .await
        .map_err(|e| MediaError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    info!(path = %path.display(), bytes = image.len(), "saved image");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_image(Path::new("/nonexistent/photo.png")).await;
        assert!(matches!(result, Err(MediaError::Read { .. })));
    }

    #[tokio::test]
    async fn test_load_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let result = load_image(&path).await;
        assert!(matches!(result, Err(MediaError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_write_then_load_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let image = EncodedImage::new(PNG_MAGIC.to_vec(), "image/png");

        let path = write_image(dir.path().join("export.png"), &image).await.unwrap();
        let loaded = load_image(&path).await.unwrap();

        assert_eq!(loaded.bytes(), image.bytes());
        assert_eq!(loaded.mime_type(), "image/png");
    }
}
