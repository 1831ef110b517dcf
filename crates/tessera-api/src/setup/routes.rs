//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tessera_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/uploads/init", post(handlers::chunked_upload::init_upload))
        .route("/uploads/chunk", post(handlers::chunked_upload::upload_chunk))
        .route(
            "/uploads/status/{upload_id}",
            get(handlers::chunked_upload::upload_status),
        )
        .route(
            "/uploads/complete",
            post(handlers::chunked_upload::complete_upload),
        )
        .route(
            "/uploads/{upload_id}/images",
            get(handlers::chunked_upload::list_upload_images),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.max_file_size_bytes()))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = config.cors_origins();

    if origins.iter().any(|o| o == "*") {
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
    } else {
        let parsed: Result<Vec<HeaderValue>, _> =
            origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
        Ok(CorsLayer::new()
            .allow_origin(parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}
