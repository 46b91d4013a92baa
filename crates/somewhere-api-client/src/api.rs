//! Domain methods for the spot backend.
//!
//! Routes:
//! - `GET /getPinpoints` → `{items: [...]}`
//! - `POST /savePinpoint` → `{item: {...}}`
//! - `GET /uploadURL?name&type` → `{uploadURL, key}`
//! - `PUT {uploadURL}` directly against object storage

use async_trait::async_trait;
use bytes::Bytes;

use somewhere_core::models::{CreateSpotResponse, ListSpotsResponse};
use somewhere_core::{
    CommittedSpot, CreateSpotRequest, SpotBackend, SpotError, SpotResult, UploadSlot,
};

use crate::{describe, ApiClient};

#[async_trait]
impl SpotBackend for ApiClient {
    async fn list_spots(&self) -> SpotResult<Vec<CommittedSpot>> {
        let response: ListSpotsResponse = self
            .get("/getPinpoints", &[])
            .await
            .map_err(|e| SpotError::Fetch(describe(&e)))?;

        tracing::debug!(count = response.items.len(), "Fetched spots");
        Ok(response.items)
    }

    async fn create_spot(&self, request: &CreateSpotRequest) -> SpotResult<CommittedSpot> {
        let response: CreateSpotResponse = self
            .post_json("/savePinpoint", request)
            .await
            .map_err(|e| SpotError::Persist(describe(&e)))?;

        Ok(response.item)
    }

    async fn request_upload_slot(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> SpotResult<UploadSlot> {
        let query = [
            ("name", file_name.to_string()),
            ("type", content_type.to_string()),
        ];
        self.get("/uploadURL", &query)
            .await
            .map_err(|e| SpotError::UploadSlot(describe(&e)))
    }

    async fn transfer(
        &self,
        upload_url: &str,
        content_type: &str,
        data: Bytes,
    ) -> SpotResult<()> {
        self.put_bytes(upload_url, content_type, data)
            .await
            .map_err(|e| SpotError::Transfer(describe(&e)))
    }
}
