//! Tessera API library
//!
//! HTTP handlers, the upload orchestration service, and application setup for
//! the resumable chunked image upload server.

mod api_doc;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use services::upload::UploadService;
