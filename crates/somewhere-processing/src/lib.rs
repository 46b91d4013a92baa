//! Somewhere Media Processing Library
//!
//! This crate turns a user-selected photo into an uploaded storage object:
//! normalize the container format, compress under a size budget, then ship it
//! through a presigned upload slot.

pub mod compression;
#[cfg(feature = "heif")]
pub mod heif;
pub mod image;
pub mod normalizer;
pub mod upload;

// Re-export commonly used types
pub use compression::{CompressionPass, JpegPass, MediaCompressor, PassParams, SizeBudgets};
pub use normalizer::{ContainerFormat, ImageCrateConverter, MediaNormalizer, RasterConverter};
pub use upload::{sanitize_filename, UploadOrchestrator};
