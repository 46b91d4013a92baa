//! Photo upload orchestration: normalize → compress → request slot → transfer.

mod pipeline;

pub use pipeline::{sanitize_filename, UploadOrchestrator};
