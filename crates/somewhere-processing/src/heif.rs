//! HEIC/HEIF decoding through libheif

use ::image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

/// Decode the primary image of a HEIF container to 8-bit RGB.
pub fn decode(data: &[u8]) -> Result<DynamicImage, anyhow::Error> {
    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data)?;
    let handle = ctx.primary_image_handle()?;
    let image = lib_heif.decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)?;

    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| anyhow::anyhow!("decoded HEIF image has no interleaved plane"))?;

    let (width, height) = (plane.width, plane.height);
    let row_bytes = width as usize * 3;
    // Rows are padded out to `stride`
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let row = row
            .get(..row_bytes)
            .ok_or_else(|| anyhow::anyhow!("HEIF plane row shorter than {} bytes", row_bytes))?;
        pixels.extend_from_slice(row);
    }

    let rgb = RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow::anyhow!("HEIF plane is smaller than {}x{}", width, height))?;
    Ok(DynamicImage::ImageRgb8(rgb))
}
