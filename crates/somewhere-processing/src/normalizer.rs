//! Container-format normalization
//!
//! Phones hand us HEIC/HEIF and scanners hand us TIFF, neither of which every
//! consumer can decode. Those are converted to JPEG before compression; any
//! other format passes through untouched.

use bytes::Bytes;
use std::sync::Arc;

use somewhere_core::{MediaFile, SpotError, SpotResult};

use crate::image::{decode, encode_jpeg, with_jpeg_extension, JPEG_CONTENT_TYPE};

const NORMALIZED_JPEG_QUALITY: u8 = 92;

/// Legacy containers that need conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Heif,
    Tiff,
}

impl ContainerFormat {
    /// Detect by content type, then by filename suffix. Both are case-insensitive.
    pub fn detect(file: &MediaFile) -> Option<Self> {
        let content_type = file.content_type.to_lowercase();
        let by_type = match content_type.trim() {
            "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence" => {
                Some(ContainerFormat::Heif)
            }
            "image/tiff" | "image/tiff-fx" => Some(ContainerFormat::Tiff),
            _ => None,
        };

        by_type.or_else(|| match file.extension().as_deref() {
            Some("heic") | Some("heif") => Some(ContainerFormat::Heif),
            Some("tif") | Some("tiff") => Some(ContainerFormat::Tiff),
            _ => None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerFormat::Heif => "heif",
            ContainerFormat::Tiff => "tiff",
        }
    }
}

/// Converts a legacy container into JPEG bytes. Runs on a blocking thread.
pub trait RasterConverter: Send + Sync {
    fn convert(&self, file: &MediaFile, format: ContainerFormat) -> SpotResult<Bytes>;
}

/// Converter backed by the `image` crate. HEIC input is decoded through libheif
/// when the `heif` feature is enabled and rejected with a normalization error
/// otherwise.
pub struct ImageCrateConverter {
    quality: u8,
}

impl Default for ImageCrateConverter {
    fn default() -> Self {
        Self {
            quality: NORMALIZED_JPEG_QUALITY,
        }
    }
}

impl RasterConverter for ImageCrateConverter {
    fn convert(&self, file: &MediaFile, format: ContainerFormat) -> SpotResult<Bytes> {
        let decoded = match format {
            #[cfg(feature = "heif")]
            ContainerFormat::Heif => crate::heif::decode(&file.data),
            _ => decode(&file.data),
        };
        let img = decoded.map_err(|e| {
            SpotError::Normalization(format!(
                "cannot decode {} input {:?}: {}",
                format.name(),
                file.file_name,
                e
            ))
        })?;
        encode_jpeg(&img, self.quality)
            .map_err(|e| SpotError::Normalization(format!("JPEG encoding failed: {}", e)))
    }
}

pub struct MediaNormalizer {
    converter: Arc<dyn RasterConverter>,
}

impl Default for MediaNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(ImageCrateConverter::default()))
    }
}

impl MediaNormalizer {
    pub fn new(converter: Arc<dyn RasterConverter>) -> Self {
        Self { converter }
    }

    /// Convert legacy containers to JPEG; pass everything else through unchanged.
    pub async fn normalize(&self, file: MediaFile) -> SpotResult<MediaFile> {
        let Some(format) = ContainerFormat::detect(&file) else {
            return Ok(file);
        };

        tracing::debug!(
            file_name = %file.file_name,
            format = format.name(),
            size_bytes = file.size_bytes(),
            "Normalizing legacy container"
        );

        let file_name = with_jpeg_extension(&file.file_name);
        let converter = Arc::clone(&self.converter);
        // Decode is CPU-bound; run off the async pool.
        let data = tokio::task::spawn_blocking(move || converter.convert(&file, format))
            .await
            .map_err(|e| SpotError::Normalization(format!("conversion task failed: {}", e)))??;

        Ok(MediaFile::new(data, file_name, JPEG_CONTENT_TYPE))
    }
}
