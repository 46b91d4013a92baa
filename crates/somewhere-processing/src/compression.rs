//! Size-budget compression
//!
//! [`MediaCompressor`] runs a convergence loop: one [`CompressionPass`] per size
//! budget, halving the budget until the output fits the caller's target. The
//! budgets come from [`SizeBudgets`], which is bounded, so the loop always
//! terminates with either a fitting file or `CompressionBudgetExceeded`.

use std::sync::Arc;

use somewhere_core::constants::{
    BYTES_PER_MB, MAX_COMPRESSION_HALVINGS, MIN_COMPRESSION_BUDGET_BYTES,
};
use somewhere_core::{MediaFile, SpotError, SpotResult};

use crate::image::{decode, encode_jpeg, fit_within, with_jpeg_extension, JPEG_CONTENT_TYPE};

/// Parameters for a single compression pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParams {
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
}

impl PassParams {
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * BYTES_PER_MB) as u64
    }
}

/// One encode attempt. Implementations should aim for `max_size_mb` but may
/// overshoot; the loop checks the real size.
pub trait CompressionPass: Send + Sync {
    fn run(&self, input: &MediaFile, params: PassParams) -> SpotResult<MediaFile>;
}

/// Decode, fit to `max_width_or_height`, then step JPEG quality down until the
/// output fits `max_size_mb` or the quality floor is hit.
pub struct JpegPass {
    start_quality: u8,
    min_quality: u8,
    quality_step: u8,
}

impl Default for JpegPass {
    fn default() -> Self {
        Self {
            start_quality: 92,
            min_quality: 22,
            quality_step: 10,
        }
    }
}

impl CompressionPass for JpegPass {
    fn run(&self, input: &MediaFile, params: PassParams) -> SpotResult<MediaFile> {
        let img = decode(&input.data).map_err(|e| {
            SpotError::Normalization(format!("cannot decode {:?}: {}", input.file_name, e))
        })?;
        let img = fit_within(img, params.max_width_or_height);
        let budget = params.max_size_bytes();

        let mut quality = self.start_quality;
        let mut smallest: Option<bytes::Bytes> = None;
        loop {
            let encoded = encode_jpeg(&img, quality)
                .map_err(|e| SpotError::Normalization(format!("JPEG encoding failed: {}", e)))?;
            let fits = encoded.len() as u64 <= budget;
            if smallest.as_ref().map_or(true, |s| encoded.len() < s.len()) {
                smallest = Some(encoded);
            }
            if fits || quality <= self.min_quality {
                break;
            }
            quality = quality.saturating_sub(self.quality_step).max(self.min_quality);
        }

        let data = smallest.unwrap_or_default();
        Ok(MediaFile::new(
            data,
            with_jpeg_extension(&input.file_name),
            JPEG_CONTENT_TYPE,
        ))
    }
}

/// Successive `max_size_mb` budgets: `initial`, `initial / 2`, ... Yields at most
/// `max_halvings + 1` values and stops once a budget falls under the byte floor.
/// The first budget is always yielded; an initial value below the floor (or not a
/// positive finite number) is raised to the floor.
#[derive(Debug, Clone)]
pub struct SizeBudgets {
    next: Option<f64>,
    remaining_halvings: u32,
}

impl SizeBudgets {
    pub fn new(initial_max_size_mb: f64, max_halvings: u32) -> Self {
        let floor_mb = MIN_COMPRESSION_BUDGET_BYTES / BYTES_PER_MB;
        let initial = if initial_max_size_mb.is_finite() && initial_max_size_mb >= floor_mb {
            initial_max_size_mb
        } else {
            floor_mb
        };
        Self {
            next: Some(initial),
            remaining_halvings: max_halvings,
        }
    }
}

impl Iterator for SizeBudgets {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let current = self.next.take()?;
        if current * BYTES_PER_MB < MIN_COMPRESSION_BUDGET_BYTES {
            return None;
        }
        if self.remaining_halvings > 0 {
            self.remaining_halvings -= 1;
            self.next = Some(current / 2.0);
        }
        Some(current)
    }
}

pub struct MediaCompressor {
    pass: Arc<dyn CompressionPass>,
    max_halvings: u32,
}

impl Default for MediaCompressor {
    fn default() -> Self {
        Self::new(Arc::new(JpegPass::default()), MAX_COMPRESSION_HALVINGS)
    }
}

impl MediaCompressor {
    pub fn new(pass: Arc<dyn CompressionPass>, max_halvings: u32) -> Self {
        Self { pass, max_halvings }
    }

    /// Compress until the output is at most `target_bytes`.
    ///
    /// `max_width_or_height` stays at `initial_max_dimension` for every pass; only
    /// the size budget shrinks.
    pub async fn compress(
        &self,
        file: &MediaFile,
        target_bytes: u64,
        initial_max_dimension: u32,
        initial_max_size_mb: f64,
    ) -> SpotResult<MediaFile> {
        let mut attempts = 0u32;
        let mut smallest_bytes: Option<u64> = None;

        for max_size_mb in SizeBudgets::new(initial_max_size_mb, self.max_halvings) {
            attempts += 1;
            let params = PassParams {
                max_size_mb,
                max_width_or_height: initial_max_dimension,
            };

            let pass = Arc::clone(&self.pass);
            let input = file.clone();
            // Encoding is CPU-bound; each pass yields to the scheduler.
            let output = tokio::task::spawn_blocking(move || pass.run(&input, params))
                .await
                .map_err(|e| {
                    SpotError::Normalization(format!("compression pass aborted: {}", e))
                })??;

            let size_bytes = output.size_bytes();
            tracing::debug!(
                attempt = attempts,
                max_size_mb,
                size_bytes,
                target_bytes,
                "Compression pass"
            );

            if size_bytes <= target_bytes {
                return Ok(output);
            }
            smallest_bytes = Some(smallest_bytes.map_or(size_bytes, |s| s.min(size_bytes)));
        }

        Err(SpotError::CompressionBudgetExceeded {
            target_bytes,
            smallest_bytes: smallest_bytes.unwrap_or_else(|| file.size_bytes()),
            attempts,
        })
    }
}
