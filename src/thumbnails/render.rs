//! Thumbnail decoding, resizing, and JPEG encoding.

use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

use crate::config::ThumbnailConfig;

/// Decode `data`, shrink it to fit the configured box, and encode as JPEG.
///
/// Images already inside the box keep their size. Aspect ratio is preserved.
pub fn render_thumbnail(data: &[u8], settings: &ThumbnailConfig) -> Result<Bytes> {
    let img = image::load_from_memory(data).context("Failed to decode image data")?;

    let img = if img.width() > settings.width || img.height() > settings.height {
        img.resize(settings.width, settings.height, FilterType::Lanczos3)
    } else {
        img
    };

    encode_jpeg(DynamicImage::ImageRgb8(img.to_rgb8()), settings.quality)
}

/// Solid-colour JPEG of exactly the configured box size.
pub fn placeholder_jpeg(settings: &ThumbnailConfig) -> Result<Bytes> {
    let img = RgbImage::from_pixel(
        settings.width,
        settings.height,
        Rgb(settings.placeholder_color),
    );
    encode_jpeg(DynamicImage::ImageRgb8(img), settings.quality)
}

fn encode_jpeg(img: DynamicImage, quality: u8) -> Result<Bytes> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .context("Failed to encode thumbnail as JPEG")?;
    Ok(Bytes::from(buf))
}
