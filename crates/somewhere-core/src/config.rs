//! Configuration module
//!
//! The backend base URL is the only environment-provided setting. Photo
//! compression policies and the allowed region are code constants.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, INLINE_INITIAL_MAX_SIZE_MB, INLINE_MAX_DIMENSION, INLINE_TARGET_BYTES,
    MAX_COMPRESSION_HALVINGS, REMOTE_INITIAL_MAX_SIZE_MB, REMOTE_MAX_DIMENSION,
    REMOTE_TARGET_BYTES, REQUEST_TIMEOUT_SECS,
};

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load from environment: SOMEWHERE_API_URL (or API_URL). Reads `.env` if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("SOMEWHERE_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "SOMEWHERE_API_URL must be an http(s) URL, got {:?}",
                self.api_url
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow::anyhow!("Request timeout must be non-zero"));
        }
        Ok(())
    }
}

/// How a compressed photo reaches the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoDelivery {
    /// PUT to a presigned slot; the record carries `photoKey`
    Remote,
    /// Base64 data URL in the record's `photo` field
    Inline,
}

/// Size policy for photo compression
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoPolicy {
    pub target_bytes: u64,
    pub max_dimension: u32,
    pub initial_max_size_mb: f64,
    pub max_halvings: u32,
    pub delivery: PhotoDelivery,
}

impl PhotoPolicy {
    /// ~3 MiB ceiling for photos shipped to object storage.
    pub fn remote() -> Self {
        Self {
            target_bytes: REMOTE_TARGET_BYTES,
            max_dimension: REMOTE_MAX_DIMENSION,
            initial_max_size_mb: REMOTE_INITIAL_MAX_SIZE_MB,
            max_halvings: MAX_COMPRESSION_HALVINGS,
            delivery: PhotoDelivery::Remote,
        }
    }

    /// ~400 KiB ceiling for photos embedded in the spot record.
    pub fn inline() -> Self {
        Self {
            target_bytes: INLINE_TARGET_BYTES,
            max_dimension: INLINE_MAX_DIMENSION,
            initial_max_size_mb: INLINE_INITIAL_MAX_SIZE_MB,
            max_halvings: MAX_COMPRESSION_HALVINGS,
            delivery: PhotoDelivery::Inline,
        }
    }
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self::remote()
    }
}
