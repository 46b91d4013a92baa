//! Error types module
//!
//! Every failure in the pinpoint pipeline is a variant of [`SpotError`]. None of
//! them is fatal to the process: photo-pipeline errors become an upload status on
//! the draft, persist errors return the draft for retry, and fetch errors degrade
//! to an empty collection.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes like out-of-region clicks
    Debug,
    /// Warning level - for recoverable issues the user can retry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented and logged
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "TRANSFER_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpotError {
    #[error("Point ({lat}, {lng}) is outside the allowed region")]
    GeofenceRejected { lat: f64, lng: f64 },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Compression budget exceeded: smallest output {smallest_bytes} bytes after {attempts} passes (target: {target_bytes} bytes)")]
    CompressionBudgetExceeded {
        target_bytes: u64,
        smallest_bytes: u64,
        attempts: u32,
    },

    #[error("Upload slot error: {0}")]
    UploadSlot(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Persist error: {0}")]
    Persist(String),

    #[error("Fetch error: {0}")]
    Fetch(String),
}

/// Result type for pipeline operations
pub type SpotResult<T> = Result<T, SpotError>;

impl SpotError {
    /// Emit this error through `tracing` at its configured level.
    pub fn log(&self, context: &str) {
        let code = self.error_code();
        let recoverable = self.is_recoverable();
        match self.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error_code = code, recoverable, error = %self, "{}", context)
            }
            LogLevel::Warn => {
                tracing::warn!(error_code = code, recoverable, error = %self, "{}", context)
            }
            LogLevel::Error => {
                tracing::error!(error_code = code, recoverable, error = %self, "{}", context)
            }
        }
    }
}

impl ErrorMetadata for SpotError {
    fn error_code(&self) -> &'static str {
        match self {
            SpotError::GeofenceRejected { .. } => "GEOFENCE_REJECTED",
            SpotError::InvalidRegion(_) => "INVALID_REGION",
            SpotError::Normalization(_) => "NORMALIZATION_ERROR",
            SpotError::CompressionBudgetExceeded { .. } => "COMPRESSION_BUDGET_EXCEEDED",
            SpotError::UploadSlot(_) => "UPLOAD_SLOT_ERROR",
            SpotError::Transfer(_) => "TRANSFER_ERROR",
            SpotError::Persist(_) => "PERSIST_ERROR",
            SpotError::Fetch(_) => "FETCH_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            SpotError::GeofenceRejected { .. } | SpotError::InvalidRegion(_) => false,
            SpotError::Normalization(_) | SpotError::CompressionBudgetExceeded { .. } => false,
            SpotError::UploadSlot(_)
            | SpotError::Transfer(_)
            | SpotError::Persist(_)
            | SpotError::Fetch(_) => true,
        }
    }

    fn client_message(&self) -> String {
        match self {
            SpotError::GeofenceRejected { .. } => {
                "You can only place a pinpoint within the allowed map region.".to_string()
            }
            SpotError::InvalidRegion(_) => "The map region is misconfigured.".to_string(),
            SpotError::Normalization(_) => {
                "This photo format could not be read. Try a different photo.".to_string()
            }
            SpotError::CompressionBudgetExceeded { .. } => {
                "This photo is too large to upload. Try a smaller photo.".to_string()
            }
            SpotError::UploadSlot(_) | SpotError::Transfer(_) => {
                "The photo upload failed. Try again or save without a photo.".to_string()
            }
            SpotError::Persist(_) => "The spot could not be saved. Try again.".to_string(),
            SpotError::Fetch(_) => "Existing spots could not be loaded.".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SpotError::GeofenceRejected { .. } => LogLevel::Debug,
            SpotError::InvalidRegion(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}
