//! HTTP surface: `GET /health` and `POST /ocr`.
//!
//! The router only translates between HTTP and the [`Extractor`]; all
//! document handling lives in the pipeline.

mod handlers;
mod response;

pub use handlers::{HealthResponse, OcrJsonRequest};
pub use response::ApiError;

use crate::extract::Extractor;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state: read-only after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Extractor>,
}

impl AppState {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            inner: Arc::new(extractor),
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.inner
    }
}

/// Build the service router with CORS, request tracing and a body limit
/// sized for the configured upload cap.
pub fn router(state: AppState) -> Router {
    let body_limit = state.extractor().config().body_limit_bytes();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ocr", post(handlers::extract_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
