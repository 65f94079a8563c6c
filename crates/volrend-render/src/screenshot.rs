//! Saving captured frames to image files.

use image::{ImageBuffer, Rgba};
use std::path::Path;

/// Converts BGRA pixel data (as read back from `Bgra8Unorm*` surfaces) to
/// RGBA in place.
pub fn bgra_to_rgba(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        chunk.swap(0, 2); // Swap B and R
    }
}

/// Saves raw RGBA pixel data to an image file.
///
/// # Arguments
/// * `filename` - Output filename (supports .png, .jpg, .jpeg)
/// * `data` - Raw RGBA pixel data (4 bytes per pixel, top row first)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
/// Returns an error if the file cannot be written or format is unsupported.
pub fn save_image(
    filename: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = filename.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    // wgpu uses top-left origin, so no vertical flip needed
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("Saved {width}x{height} image to {}", path.display());
    Ok(())
}

/// Encodes raw RGBA pixel data as PNG in memory.
pub fn save_to_buffer(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;

    Ok(buffer.into_inner())
}

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_swap() {
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        bgra_to_rgba(&mut data);
        assert_eq!(data, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn test_png_buffer_signature() {
        let data = vec![255u8; 2 * 2 * 4];
        let png = save_to_buffer(&data, 2, 2).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_short_data_is_rejected() {
        assert!(matches!(
            save_to_buffer(&[0u8; 3], 1, 1),
            Err(ScreenshotError::InvalidImageData)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let data = vec![0u8; 4];
        let path = std::env::temp_dir().join("volrend_frame.bmpx");
        assert!(matches!(
            save_image(&path, &data, 1, 1),
            Err(ScreenshotError::UnsupportedFormat(_))
        ));
    }
}
