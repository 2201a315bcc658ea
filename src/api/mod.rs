//! Web API module for Easel
//!
//! Provides REST API endpoints for:
//! - Canvas scene mutation and snapshots
//! - PNG preview and PDF export
//! - Health checks

pub mod canvas;
pub mod health;

use axum::Router;

pub use canvas::{canvas_routes_with_state, CanvasLimits, CanvasState};
pub use health::health_routes_with_state;

/// Create the API router with all endpoints
pub fn api_router_with_state(state: CanvasState) -> Router {
    Router::new()
        .merge(health_routes_with_state(state.store.clone()))
        .merge(canvas_routes_with_state(state))
}
