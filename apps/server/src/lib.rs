// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIPV-Lite Server - building-integrated photovoltaic potential estimator.
//!
//! Users pick a location and date, the server looks up the day's global
//! horizontal irradiance (GHI) and stores an uploaded glTF model. The viewer
//! endpoints then estimate the daily energy each surface of the model could
//! produce.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /upload` - Store a model, returns the generated filename
//! - `GET /uploads/:filename` - Stored models, served as static files
//! - `GET /api/v1/ghi` - Daily GHI lookup
//! - `POST /api/v1/submit` - GHI lookup followed by upload
//! - `GET /api/v1/viewer` - Estimate for a stored model (JSON)
//! - `GET /api/v1/viewer/stream` - Estimate plus frame events (SSE)

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

use config::Config;
use services::{GhiClient, UploadStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UploadStore>,
    pub ghi: Arc<GhiClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the upload store and build the GHI client for `config`.
    pub async fn new(config: Config) -> Self {
        let store = UploadStore::new(&config.upload_dir).await;
        let ghi = GhiClient::new(&config.ghi_api_url);

        Self {
            store: Arc::new(store),
            ghi: Arc::new(ghi),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.store.root());
    let max_body = state.config.max_file_size_mb * 1024 * 1024;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        .route("/api/v1/health", get(routes::health::check))
        // Upload gateway
        .route("/upload", post(routes::upload::upload))
        .nest_service("/uploads", uploads)
        // Location, irradiance and submit
        .route("/api/v1/ghi", get(routes::ghi::lookup))
        .route("/api/v1/submit", post(routes::submit::submit))
        // Viewer
        .route("/api/v1/viewer", get(routes::viewer::view))
        .route("/api/v1/viewer/stream", get(routes::viewer::stream_view))
        // Middleware
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
