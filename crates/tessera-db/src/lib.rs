//! Upload and image ledger persistence.
//!
//! Repositories are defined as traits so the orchestration layer depends on
//! injected collaborators rather than a concrete database: [`postgres`]
//! provides the sqlx-backed production implementations, [`memory`] an
//! in-process implementation used by tests and embedded setups.

pub mod memory;
pub mod models;
pub mod postgres;
mod traits;

pub use memory::InMemoryLedger;
pub use models::{Image, NewImage, NewUpload, Upload};
pub use postgres::{PgImageRepository, PgUploadRepository};
pub use traits::{ImageRepository, UploadRepository};
