//! Domain models
//!
//! Wire shapes follow the backend API: spots are flat `{lat, lng, description, photoUrl?}`
//! objects, upload slots are `{uploadURL, key}`.

pub mod media;
pub mod spot;

pub use media::{
    content_type_for, InlinePhoto, MediaFile, PhotoAttachment, UploadSlot, UploadedPhoto,
};
pub use spot::{
    BoundingRegion, CommittedSpot, Coordinate, CreateSpotRequest, CreateSpotResponse,
    ListSpotsResponse,
};
