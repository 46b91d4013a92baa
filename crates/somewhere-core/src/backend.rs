//! Backend seam
//!
//! The pipeline talks to the spot backend and object storage only through this
//! trait, so the controller and orchestrator can be exercised against an
//! in-memory implementation. `somewhere-api-client` provides the HTTP one.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SpotResult;
use crate::models::{CommittedSpot, CreateSpotRequest, UploadSlot};

#[async_trait]
pub trait SpotBackend: Send + Sync {
    /// Fetch every committed spot. Fails with `SpotError::Fetch`.
    async fn list_spots(&self) -> SpotResult<Vec<CommittedSpot>>;

    /// Persist a finished spot. Fails with `SpotError::Persist`.
    async fn create_spot(&self, request: &CreateSpotRequest) -> SpotResult<CommittedSpot>;

    /// Ask for a presigned destination. Fails with `SpotError::UploadSlot`.
    async fn request_upload_slot(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> SpotResult<UploadSlot>;

    /// PUT bytes to a presigned URL. Fails with `SpotError::Transfer`.
    async fn transfer(&self, upload_url: &str, content_type: &str, data: Bytes)
        -> SpotResult<()>;
}
