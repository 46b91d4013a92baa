//! Somewhere Core Library
//!
//! This crate provides the domain models, geofence predicate, error taxonomy,
//! configuration, and the backend seam shared by every Somewhere component.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod geofence;
pub mod models;

// Re-export commonly used types
pub use backend::SpotBackend;
pub use config::{ClientConfig, PhotoDelivery, PhotoPolicy};
pub use error::{ErrorMetadata, LogLevel, SpotError, SpotResult};
pub use geofence::contains;
pub use models::{
    content_type_for, BoundingRegion, CommittedSpot, Coordinate, CreateSpotRequest, InlinePhoto,
    MediaFile, PhotoAttachment, UploadSlot, UploadedPhoto,
};
