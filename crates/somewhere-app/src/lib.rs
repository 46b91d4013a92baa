//! Somewhere app: the pending-spot state machine and the in-memory spot
//! collection it appends to. The `somewhere` binary drives both against the
//! HTTP backend.

pub mod collection;
pub mod controller;

pub use collection::SpotCollection;
pub use controller::{
    ControllerError, ControllerState, PendingSpot, PendingSpotController, PhotoOutcome,
    PhotoTicket, ScreenAnchor, UploadStatus,
};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
