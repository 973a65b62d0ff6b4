//! Image probing, resizing and re-encoding.
//!
//! Everything here is CPU-bound and synchronous; the pipeline runs these
//! functions under `tokio::task::spawn_blocking`.

use std::io::Cursor;

use craftlog_core::{AppError, AppResult};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

/// Probe actual pixel dimensions without decoding the full image.
pub fn probe_dimensions(data: &[u8]) -> AppResult<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(AppError::Filesystem)?
        .into_dimensions()
        .map_err(|e| AppError::MissingDimensions(e.to_string()))
}

/// Height derived from the source aspect ratio for a target width.
pub fn derive_height(orig_width: u32, orig_height: u32, target_width: u32) -> u32 {
    let aspect_ratio = orig_height as f32 / orig_width.max(1) as f32;
    ((target_width as f32 * aspect_ratio).round() as u32).max(1)
}

/// Select a resampling filter based on how far the image is scaled down.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width.max(1) as f32;
    let height_ratio = orig_height as f32 / new_height.max(1) as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

fn decode(data: &[u8]) -> AppResult<(DynamicImage, ImageFormat)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(AppError::Filesystem)?;
    let format = reader
        .format()
        .ok_or_else(|| AppError::ImageProcessing("unrecognized image format".to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| AppError::ImageProcessing(e.to_string()))?;
    Ok((img, format))
}

/// Re-encode in the original format. Re-encoding drops any embedded
/// metadata; `quality` applies to JPEG output only.
fn encode(img: &DynamicImage, format: ImageFormat, quality: Option<u8>) -> AppResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let result = if format == ImageFormat::Jpeg {
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality.unwrap_or(90));
        rgb.write_with_encoder(encoder)
    } else {
        img.write_to(&mut buf, format)
    };
    result.map_err(|e| AppError::ImageProcessing(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Cover-fit, center-gravity rendition of `width` x `height`.
///
/// Sources already smaller than the target in both dimensions are not
/// upscaled; they are re-encoded as-is.
pub fn render_cover(
    data: &[u8],
    width: u32,
    height: u32,
    quality: Option<u8>,
) -> AppResult<Vec<u8>> {
    let (img, format) = decode(data)?;
    let (orig_width, orig_height) = img.dimensions();

    let rendered = if width >= orig_width && height >= orig_height {
        img
    } else {
        let filter = select_filter(orig_width, orig_height, width, height);
        img.resize_to_fill(width, height, filter)
    };
    encode(&rendered, format, quality)
}

/// Small compressed rendition fitting within `bound` x `bound`, aspect
/// preserved, metadata stripped. Sources already within the bound are only
/// re-encoded.
pub fn render_thumb(data: &[u8], bound: u32, quality: u8) -> AppResult<Vec<u8>> {
    let (img, format) = decode(data)?;
    let (orig_width, orig_height) = img.dimensions();

    let rendered = if orig_width <= bound && orig_height <= bound {
        img
    } else {
        let filter = select_filter(orig_width, orig_height, bound, bound);
        img.resize(bound, bound, filter)
    };
    encode(&rendered, format, Some(quality))
}
