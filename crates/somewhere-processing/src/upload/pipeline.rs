//! Upload pipeline: normalize → compress → request slot → transfer.
//!
//! Inline policies stop after compression and embed the photo as a base64
//! `data:` URL instead. The orchestrator never touches draft state. It returns
//! the photo reference or the first failing step's error; the controller decides
//! whether the result is still current and applies it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use somewhere_core::constants::REQUEST_TIMEOUT_SECS;
use somewhere_core::{
    InlinePhoto, MediaFile, PhotoAttachment, PhotoDelivery, PhotoPolicy, SpotBackend, SpotError,
    SpotResult, UploadedPhoto,
};

use crate::compression::MediaCompressor;
use crate::normalizer::MediaNormalizer;

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 200;
    // `file_name()` is None for names ending in `..`
    let Some(base) = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
    else {
        return "photo.jpg".to_string();
    };
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() || s.len() < 3 {
        "photo.jpg".to_string()
    } else {
        s
    }
}

pub struct UploadOrchestrator {
    normalizer: MediaNormalizer,
    compressor: MediaCompressor,
    backend: Arc<dyn SpotBackend>,
    policy: PhotoPolicy,
    request_timeout: Duration,
    sequence: AtomicU64,
}

impl UploadOrchestrator {
    /// Orchestrator with the default normalizer and JPEG compressor.
    pub fn new(backend: Arc<dyn SpotBackend>, policy: PhotoPolicy) -> Self {
        Self::with_components(
            MediaNormalizer::default(),
            MediaCompressor::new(
                Arc::new(crate::compression::JpegPass::default()),
                policy.max_halvings,
            ),
            backend,
            policy,
        )
    }

    pub fn with_components(
        normalizer: MediaNormalizer,
        compressor: MediaCompressor,
        backend: Arc<dyn SpotBackend>,
        policy: PhotoPolicy,
    ) -> Self {
        Self {
            normalizer,
            compressor,
            backend,
            policy,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            sequence: AtomicU64::new(0),
        }
    }

    /// Bound on each backend call (slot request, transfer).
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Process one photo selection the way the policy delivers it.
    pub async fn attach(&self, raw: MediaFile) -> SpotResult<PhotoAttachment> {
        match self.policy.delivery {
            PhotoDelivery::Remote => self.upload(raw).await.map(PhotoAttachment::from),
            PhotoDelivery::Inline => self.encode_inline(raw).await.map(PhotoAttachment::from),
        }
    }

    async fn prepare(&self, raw: MediaFile) -> SpotResult<MediaFile> {
        tracing::info!(
            file_name = %raw.file_name,
            content_type = %raw.content_type,
            size_bytes = raw.size_bytes(),
            delivery = ?self.policy.delivery,
            "Preparing photo"
        );

        let raster = self.normalizer.normalize(raw).await?;

        self.compressor
            .compress(
                &raster,
                self.policy.target_bytes,
                self.policy.max_dimension,
                self.policy.initial_max_size_mb,
            )
            .await
    }

    /// Normalize and compress, then return the result as a `data:` URL. No
    /// backend call is made.
    pub async fn encode_inline(&self, raw: MediaFile) -> SpotResult<InlinePhoto> {
        let compressed = self.prepare(raw).await?;
        let size_bytes = compressed.size_bytes();
        let data_url = format!(
            "data:{};base64,{}",
            compressed.content_type,
            STANDARD.encode(&compressed.data)
        );

        tracing::info!(size_bytes, "Photo encoded inline");

        Ok(InlinePhoto {
            data_url,
            content_type: compressed.content_type,
            size_bytes,
        })
    }

    /// Run the whole remote pipeline for one photo selection. Steps run
    /// strictly in sequence and the first failure aborts the rest.
    pub async fn upload(&self, raw: MediaFile) -> SpotResult<UploadedPhoto> {
        let compressed = self.prepare(raw).await?;

        let file_name = self.storage_file_name(&compressed.file_name);
        let content_type = compressed.content_type.clone();
        let size_bytes = compressed.size_bytes();

        let slot = tokio::time::timeout(
            self.request_timeout,
            self.backend.request_upload_slot(&file_name, &content_type),
        )
        .await
        .map_err(|_| {
            SpotError::UploadSlot(format!(
                "upload slot request timed out after {:?}",
                self.request_timeout
            ))
        })??;

        tokio::time::timeout(
            self.request_timeout,
            self.backend
                .transfer(&slot.upload_url, &content_type, compressed.data),
        )
        .await
        .map_err(|_| {
            SpotError::Transfer(format!(
                "transfer timed out after {:?}",
                self.request_timeout
            ))
        })??;

        tracing::info!(key = %slot.key, size_bytes, "Photo uploaded");

        Ok(UploadedPhoto {
            key: slot.key,
            content_type,
            size_bytes,
        })
    }

    /// `{unix_millis}-{sequence}-{sanitized}` so concurrent selections never collide.
    fn storage_file_name(&self, file_name: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            sequence,
            sanitize_filename(file_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test_images::{encode, gradient};
    use ::image::ImageFormat;
    use async_trait::async_trait;
    use base64::Engine as _;
    use bytes::Bytes;
    use somewhere_core::{CommittedSpot, CreateSpotRequest, UploadSlot};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        slot_requests: Mutex<Vec<(String, String)>>,
        transfers: Mutex<Vec<(String, String, usize)>>,
        fail_slot: bool,
        fail_transfer: bool,
        slot_delay: Option<Duration>,
    }

    #[async_trait]
    impl SpotBackend for RecordingBackend {
        async fn list_spots(&self) -> SpotResult<Vec<CommittedSpot>> {
            Ok(Vec::new())
        }

        async fn create_spot(&self, _request: &CreateSpotRequest) -> SpotResult<CommittedSpot> {
            Err(SpotError::Persist("not used".into()))
        }

        async fn request_upload_slot(
            &self,
            file_name: &str,
            content_type: &str,
        ) -> SpotResult<UploadSlot> {
            if let Some(delay) = self.slot_delay {
                tokio::time::sleep(delay).await;
            }
            self.slot_requests
                .lock()
                .unwrap()
                .push((file_name.to_string(), content_type.to_string()));
            if self.fail_slot {
                return Err(SpotError::UploadSlot("503 Service Unavailable".into()));
            }
            Ok(UploadSlot {
                upload_url: format!("https://bucket.example.com/{}?sig=abc", file_name),
                key: format!("spots/{}", file_name),
            })
        }

        async fn transfer(
            &self,
            upload_url: &str,
            content_type: &str,
            data: Bytes,
        ) -> SpotResult<()> {
            self.transfers.lock().unwrap().push((
                upload_url.to_string(),
                content_type.to_string(),
                data.len(),
            ));
            if self.fail_transfer {
                return Err(SpotError::Transfer("connection reset".into()));
            }
            Ok(())
        }
    }

    fn photo() -> MediaFile {
        let data = encode(&gradient(640, 480), ImageFormat::Png);
        MediaFile::new(data, "My Photo.png", "image/png")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Photo.png"), "My_Photo.png");
        assert_eq!(sanitize_filename("dir/sub/bench.jpg"), "bench.jpg");
        assert_eq!(sanitize_filename("café.jpg"), "caf_.jpg");
        assert_eq!(sanitize_filename("bench..jpg"), "bench..jpg");
        assert_eq!(sanitize_filename("../.."), "photo.jpg");
        assert_eq!(sanitize_filename(".."), "photo.jpg");
        assert_eq!(sanitize_filename("a"), "photo.jpg");
        assert_eq!(sanitize_filename(""), "photo.jpg");
    }

    #[tokio::test]
    async fn test_upload_success() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());

        let uploaded = orchestrator.upload(photo()).await.unwrap();

        let slots = backend.slot_requests.lock().unwrap();
        assert_eq!(slots.len(), 1);
        let (name, content_type) = &slots[0];
        assert!(name.ends_with("-1-My_Photo.jpg"), "{}", name);
        assert_eq!(content_type, "image/jpeg");

        let transfers = backend.transfers.lock().unwrap();
        assert_eq!(transfers.len(), 1);
        assert!(transfers[0].0.contains(name.as_str()));
        assert_eq!(transfers[0].1, "image/jpeg");
        assert_eq!(transfers[0].2 as u64, uploaded.size_bytes);

        assert_eq!(uploaded.key, format!("spots/{}", name));
        assert_eq!(uploaded.content_type, "image/jpeg");
        assert!(uploaded.size_bytes <= PhotoPolicy::remote().target_bytes);
    }

    #[tokio::test]
    async fn test_file_names_are_disambiguated() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());

        orchestrator.upload(photo()).await.unwrap();
        orchestrator.upload(photo()).await.unwrap();

        let slots = backend.slot_requests.lock().unwrap();
        assert!(slots[0].0.contains("-1-"));
        assert!(slots[1].0.contains("-2-"));
        assert_ne!(slots[0].0, slots[1].0);
    }

    #[tokio::test]
    async fn test_attach_remote_uploads() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());

        let attachment = orchestrator.attach(photo()).await.unwrap();

        match attachment {
            PhotoAttachment::Stored(uploaded) => assert!(uploaded.key.starts_with("spots/")),
            other => panic!("expected stored photo, got {:?}", other),
        }
        assert_eq!(backend.transfers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attach_inline_skips_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::inline());

        let attachment = orchestrator.attach(photo()).await.unwrap();

        let inline = match attachment {
            PhotoAttachment::Inline(inline) => inline,
            other => panic!("expected inline photo, got {:?}", other),
        };
        assert!(backend.slot_requests.lock().unwrap().is_empty());
        assert!(backend.transfers.lock().unwrap().is_empty());

        assert_eq!(inline.content_type, "image/jpeg");
        assert!(inline.size_bytes <= PhotoPolicy::inline().target_bytes);
        let encoded = inline
            .data_url
            .strip_prefix("data:image/jpeg;base64,")
            .unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded.len() as u64, inline.size_bytes);
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_inline_normalization_failure() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend, PhotoPolicy::inline());
        let raw = MediaFile::new(b"not really heic".to_vec(), "IMG_0001.HEIC", "image/heic");

        let result = orchestrator.encode_inline(raw).await;
        assert!(matches!(result, Err(SpotError::Normalization(_))));
    }

    #[tokio::test]
    async fn test_normalization_failure_aborts_before_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());
        let raw = MediaFile::new(b"not really heic".to_vec(), "IMG_0001.HEIC", "image/heic");

        let result = orchestrator.upload(raw).await;

        assert!(matches!(result, Err(SpotError::Normalization(_))));
        assert!(backend.slot_requests.lock().unwrap().is_empty());
        assert!(backend.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slot_failure_skips_transfer() {
        let backend = Arc::new(RecordingBackend {
            fail_slot: true,
            ..Default::default()
        });
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());

        let result = orchestrator.upload(photo()).await;

        assert!(matches!(result, Err(SpotError::UploadSlot(_))));
        assert!(backend.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_failure() {
        let backend = Arc::new(RecordingBackend {
            fail_transfer: true,
            ..Default::default()
        });
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote());

        let result = orchestrator.upload(photo()).await;
        assert!(matches!(result, Err(SpotError::Transfer(_))));
    }

    #[tokio::test]
    async fn test_slot_request_timeout() {
        let backend = Arc::new(RecordingBackend {
            slot_delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let orchestrator = UploadOrchestrator::new(backend.clone(), PhotoPolicy::remote())
            .with_request_timeout(Duration::from_millis(20));

        let result = orchestrator.upload(photo()).await;

        match result {
            Err(SpotError::UploadSlot(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected UploadSlot timeout, got {:?}", other),
        }
        assert!(backend.transfers.lock().unwrap().is_empty());
    }
}
