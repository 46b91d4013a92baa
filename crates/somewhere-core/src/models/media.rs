use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file moving through the photo pipeline (raw, normalized, or compressed).
#[derive(Clone, Debug, PartialEq)]
pub struct MediaFile {
    pub data: Bytes,
    pub file_name: String,
    pub content_type: String,
}

impl MediaFile {
    pub fn new(
        data: impl Into<Bytes>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased filename suffix without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Best-effort MIME type from a filename suffix.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Pre-authorized destination issued by `GET /uploadURL`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadSlot {
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    pub key: String,
}

/// Storage reference produced by a successful photo upload
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedPhoto {
    pub key: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Photo embedded in the spot record as a `data:` URL
#[derive(Clone, Debug, PartialEq)]
pub struct InlinePhoto {
    pub data_url: String,
    pub content_type: String,
    /// Size of the encoded image before base64
    pub size_bytes: u64,
}

/// What a finished photo selection leaves on the draft.
#[derive(Clone, Debug, PartialEq)]
pub enum PhotoAttachment {
    Stored(UploadedPhoto),
    Inline(InlinePhoto),
}

impl From<UploadedPhoto> for PhotoAttachment {
    fn from(photo: UploadedPhoto) -> Self {
        PhotoAttachment::Stored(photo)
    }
}

impl From<InlinePhoto> for PhotoAttachment {
    fn from(photo: InlinePhoto) -> Self {
        PhotoAttachment::Inline(photo)
    }
}
