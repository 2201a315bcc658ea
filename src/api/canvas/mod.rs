//! Canvas API endpoints
//!
//! POST /api/canvas/init          - Replace the scene with an empty canvas
//! POST /api/canvas/clear         - Remove all elements
//! POST /api/canvas/add-rectangle - Append a rectangle
//! POST /api/canvas/add-circle    - Append a circle
//! POST /api/canvas/add-text      - Append a text run
//! POST /api/canvas/add-image     - Append an image (multipart upload or URL)
//! GET  /api/canvas/state         - Current scene snapshot
//! GET  /api/canvas/preview.png   - Server-rendered PNG of the scene
//! POST /api/canvas/export-pdf    - Single-page PDF download

pub mod handlers;
pub mod types;

#[cfg(test)]
mod tests;

pub use handlers::{
    add_circle, add_image, add_rectangle, add_text, clear_canvas, export_pdf, get_state,
    init_canvas, preview_png,
};
pub use types::{CanvasLimits, CanvasResponse};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use easel_canvas::{ExportPipeline, SceneStore};
use std::sync::Arc;

/// Multipart framing and the small text fields on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared canvas state handed to every handler
#[derive(Clone)]
pub struct CanvasState {
    pub store: Arc<SceneStore>,
    pub pipeline: ExportPipeline,
    pub limits: CanvasLimits,
}

impl CanvasState {
    pub fn new(store: Arc<SceneStore>, pipeline: ExportPipeline, limits: CanvasLimits) -> Self {
        Self {
            store,
            pipeline,
            limits,
        }
    }
}

/// Create canvas routes bound to the shared state
pub fn canvas_routes_with_state(state: CanvasState) -> Router {
    let upload_limit = state.limits.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/canvas/init", post(init_canvas))
        .route("/api/canvas/clear", post(clear_canvas))
        .route("/api/canvas/add-rectangle", post(add_rectangle))
        .route("/api/canvas/add-circle", post(add_circle))
        .route("/api/canvas/add-text", post(add_text))
        .route(
            "/api/canvas/add-image",
            post(add_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/canvas/state", get(get_state))
        .route("/api/canvas/preview.png", get(preview_png))
        .route("/api/canvas/export-pdf", post(export_pdf))
        .with_state(state)
}
