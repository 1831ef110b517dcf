//! Core types shared across the Tessera workspace: the unified error enum,
//! environment-driven configuration, constants, and API data-transfer models.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
