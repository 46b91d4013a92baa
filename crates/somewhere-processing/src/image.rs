//! Decode, resize, and JPEG-encode helpers shared by the normalizer and compressor.

use ::image::imageops::FilterType;
use ::image::{DynamicImage, GenericImageView, ImageReader};
use bytes::Bytes;
use std::io::Cursor;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Decode any format the `image` crate can sniff from content.
pub fn decode(data: &[u8]) -> Result<DynamicImage, anyhow::Error> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(anyhow::anyhow!("unrecognized image format"));
    }
    Ok(reader.decode()?)
}

/// Downscale so neither side exceeds `max_width_or_height`, preserving aspect ratio.
/// Images already within bounds are returned as-is.
pub fn fit_within(img: DynamicImage, max_width_or_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if max_width_or_height == 0 || (width <= max_width_or_height && height <= max_width_or_height)
    {
        return img;
    }
    img.resize(max_width_or_height, max_width_or_height, FilterType::Lanczos3)
}

/// Encode to progressive JPEG using mozjpeg
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, anyhow::Error> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality.clamp(1, 100) as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb_img)?;
    let jpeg_data = comp.finish()?;

    Ok(Bytes::from(jpeg_data))
}

/// Replace the filename suffix with `.jpg`.
pub fn with_jpeg_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned()
}
