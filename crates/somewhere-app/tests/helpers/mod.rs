#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use somewhere_core::{
    CommittedSpot, CreateSpotRequest, MediaFile, PhotoPolicy, SpotBackend, SpotError, SpotResult,
    UploadSlot,
};
use somewhere_processing::UploadOrchestrator;

/// In-memory stand-in for the HTTP backend and object storage.
#[derive(Default)]
pub struct MemoryBackend {
    pub spots: Mutex<Vec<CommittedSpot>>,
    pub create_calls: Mutex<Vec<CreateSpotRequest>>,
    pub slot_requests: Mutex<Vec<String>>,
    pub stored_objects: Mutex<Vec<(String, usize)>>,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_transfer: AtomicBool,
    pub create_delay: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_spots(spots: Vec<CommittedSpot>) -> Arc<Self> {
        let backend = Self::default();
        *backend.spots.lock().unwrap() = spots;
        Arc::new(backend)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.lock().unwrap().len()
    }

    pub fn last_create_call(&self) -> Option<CreateSpotRequest> {
        self.create_calls.lock().unwrap().last().cloned()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_transfer(&self, fail: bool) {
        self.fail_transfer.store(fail, Ordering::SeqCst);
    }

    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl SpotBackend for MemoryBackend {
    async fn list_spots(&self) -> SpotResult<Vec<CommittedSpot>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(SpotError::Fetch("connection refused".into()));
        }
        Ok(self.spots.lock().unwrap().clone())
    }

    async fn create_spot(&self, request: &CreateSpotRequest) -> SpotResult<CommittedSpot> {
        self.create_calls.lock().unwrap().push(request.clone());

        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(SpotError::Persist(
                "API request failed with status 500 Internal Server Error".into(),
            ));
        }

        let spot = CommittedSpot {
            coordinate: request.coordinate,
            description: request.description.clone(),
            photo_url: request
                .photo_key
                .as_ref()
                .map(|key| format!("https://cdn.example.com/{}", key))
                .or_else(|| request.photo.clone()),
        };
        self.spots.lock().unwrap().push(spot.clone());
        Ok(spot)
    }

    async fn request_upload_slot(
        &self,
        file_name: &str,
        _content_type: &str,
    ) -> SpotResult<UploadSlot> {
        self.slot_requests
            .lock()
            .unwrap()
            .push(file_name.to_string());
        Ok(UploadSlot {
            upload_url: format!("https://bucket.example.com/spots/{}?sig=test", file_name),
            key: format!("spots/{}", file_name),
        })
    }

    async fn transfer(&self, upload_url: &str, _content_type: &str, data: Bytes) -> SpotResult<()> {
        if self.fail_transfer.load(Ordering::SeqCst) {
            return Err(SpotError::Transfer("connection reset by peer".into()));
        }
        self.stored_objects
            .lock()
            .unwrap()
            .push((upload_url.to_string(), data.len()));
        Ok(())
    }
}

pub fn orchestrator(backend: &Arc<MemoryBackend>) -> UploadOrchestrator {
    UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote())
}

pub fn inline_orchestrator(backend: &Arc<MemoryBackend>) -> UploadOrchestrator {
    UploadOrchestrator::new(backend.clone(), PhotoPolicy::inline())
}

/// PNG photo with a smooth gradient.
pub fn png_photo(file_name: &str) -> MediaFile {
    let img = RgbImage::from_fn(320, 240, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    MediaFile::new(buf.into_inner(), file_name, "image/png")
}

/// Bytes labelled HEIC that no decoder will accept.
pub fn broken_heic(file_name: &str) -> MediaFile {
    MediaFile::new(b"ftypheic but not really".to_vec(), file_name, "image/heic")
}
