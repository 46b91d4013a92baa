//! Application-wide constants

use crate::models::{BoundingRegion, Coordinate};

/// Gainesville city boundaries. Pins outside this rectangle are rejected.
pub const DEFAULT_REGION: BoundingRegion = BoundingRegion::from_ordered(
    Coordinate::new(29.5827, -82.6527),
    Coordinate::new(29.7075, -82.2812),
);

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// Remote-storage photo variant (presigned PUT)
pub const REMOTE_TARGET_BYTES: u64 = 3 * 1024 * 1024;
pub const REMOTE_MAX_DIMENSION: u32 = 1920;
pub const REMOTE_INITIAL_MAX_SIZE_MB: f64 = 3.0;

// Inline-encoded photo variant
pub const INLINE_TARGET_BYTES: u64 = 400 * 1024;
pub const INLINE_MAX_DIMENSION: u32 = 1024;
pub const INLINE_INITIAL_MAX_SIZE_MB: f64 = 0.4;

/// Upper bound on size-budget halvings in the compression loop.
pub const MAX_COMPRESSION_HALVINGS: u32 = 8;

/// Budgets below this are not attempted.
pub const MIN_COMPRESSION_BUDGET_BYTES: f64 = 1024.0;
