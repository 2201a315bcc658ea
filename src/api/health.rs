//! Health check endpoint
//!
//! `/health` reports "healthy", the build version and the current element
//! count (for load balancers and quick smoke checks).

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use easel_canvas::SceneStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub elements: usize,
}

async fn health_check(State(store): State<Arc<SceneStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        elements: store.element_count().await,
    })
}

/// Create health routes
pub fn health_routes_with_state(store: Arc<SceneStore>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(store)
}
