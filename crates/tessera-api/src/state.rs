//! Application state shared across handlers.

use crate::services::upload::UploadService;
use tessera_core::Config;

/// Main application state: the upload orchestration service plus configuration.
/// Collaborators (ledger repositories, blob storage) are injected into the
/// service at setup time; handlers never touch them directly.
#[derive(Clone)]
pub struct AppState {
    pub service: UploadService,
    pub config: Config,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
