//! Upload orchestration: chunk receipt, status, assembly, and variant
//! generation, coordinated per upload id.

mod locks;
mod service;

pub use locks::UploadLocks;
pub use service::{storage_app_error, CompletionOutcome, UploadService};
