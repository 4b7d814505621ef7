// Router assembly
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{diagnose, empty_result, health_check};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/diagnose", get(empty_result).post(diagnose))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
