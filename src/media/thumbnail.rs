use image::imageops::FilterType;
use tracing::debug;

use super::{MediaError, PreviewFrame};
use crate::state::data::EncodedImage;

/// Size of generated thumbnails (square bound)
const THUMBNAIL_SIZE: u32 = 256;

/// Generate a thumbnail frame for the home grid
pub async fn generate_thumbnail(image: EncodedImage) -> Result<PreviewFrame, MediaError> {
    // Decoding is CPU-bound
    tokio::task::spawn_blocking(move || generate_thumbnail_blocking(&image))
        .await
        .map_err(|e| MediaError::Join(e.to_string()))?
}

fn generate_thumbnail_blocking(image: &EncodedImage) -> Result<PreviewFrame, MediaError> {
    let decoded =
        image::load_from_memory(image.bytes()).map_err(|e| MediaError::Decode(e.to_string()))?;

    let thumbnail = decoded.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    debug!(
        width = thumbnail.width(),
        height = thumbnail.height(),
        "generated thumbnail"
    );

    Ok(PreviewFrame::from_rgba(thumbnail.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_thumbnail_fits_bound() {
        let image = EncodedImage::new(png_bytes(1024, 512), "image/png");
        let frame = generate_thumbnail(image).await.unwrap();
        assert_eq!(frame.width, 256);
        assert_eq!(frame.height, 128);
    }

    #[tokio::test]
    async fn test_thumbnail_rejects_garbage() {
        let image = EncodedImage::new(b"garbage".to_vec(), "image/png");
        let result = generate_thumbnail(image).await;
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }
}
