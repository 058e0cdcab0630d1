//! HTTP wrapper around the outline splitter.
//!
//! `POST /split` takes a multipart upload (`file`: the outline document,
//! `level`: optional split depth) and answers with a zip archive of the
//! chapter files. Content referenced by the outline must be inline in the
//! uploaded document.

pub mod archive;
pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use error::ApiError;

/// Build the application router.
pub fn app(config: ApiConfig) -> Router {
    let max_upload_bytes = config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/split", post(handlers::split_upload))
        .with_state(Arc::new(config))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
