/// Filter previews for the Adjust and Filters tools
///
/// Renders the working image through a `FilterChain` at working-preview
/// resolution. The result is only displayed, the encoded image is untouched.
use image::imageops::FilterType;

use super::{MediaError, PreviewFrame};
use crate::color::FilterChain;
use crate::state::data::EncodedImage;

/// Longest edge of the working preview
const WORKING_PREVIEW_SIZE: u32 = 1280;

/// Render `image` through `chain` on a blocking thread
pub async fn render_preview(
    image: EncodedImage,
    chain: FilterChain,
) -> Result<PreviewFrame, MediaError> {
    tokio::task::spawn_blocking(move || render_preview_blocking(&image, &chain))
        .await
        .map_err(|e| MediaError::Join(e.to_string()))?
}

fn render_preview_blocking(
    image: &EncodedImage,
    chain: &FilterChain,
) -> Result<PreviewFrame, MediaError> {
    let mut decoded =
        image::load_from_memory(image.bytes()).map_err(|e| MediaError::Decode(e.to_string()))?;

    if decoded.width().max(decoded.height()) > WORKING_PREVIEW_SIZE {
        decoded = decoded.resize(WORKING_PREVIEW_SIZE, WORKING_PREVIEW_SIZE, FilterType::Triangle);
    }

    let mut rgba = decoded.to_rgba8();
    chain.apply_rgba(&mut rgba);

    Ok(PreviewFrame::from_rgba(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::FilterOp;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> EncodedImage {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        EncodedImage::new(out.into_inner(), "image/png")
    }

    #[test]
    fn test_large_images_are_downscaled() {
        let frame = render_preview_blocking(&png(2560, 1280, [0, 0, 0, 255]), &FilterChain::default())
            .unwrap();
        assert_eq!((frame.width, frame.height), (1280, 640));
    }

    #[tokio::test]
    async fn test_small_images_keep_size() {
        let chain = FilterChain::new(vec![FilterOp::Grayscale(1.0)]);
        let frame = render_preview(png(64, 32, [255, 0, 0, 255]), chain).await.unwrap();
        assert_eq!((frame.width, frame.height), (64, 32));
    }
}
