//! Server initialization and main run loop
//!
//! Contains the main `run()` function that wires the scene store, the render
//! pipeline and the HTTP router together.

use super::config::AppConfig;
use super::loader::load_config;
use super::shutdown::wait_for_shutdown_signal;
use super::validation::validate_config;
use crate::api::{api_router_with_state, CanvasLimits, CanvasState};
use anyhow::{Context, Result};
use axum::Router;
use easel_canvas::{ExportPipeline, HttpImageLoader, SceneStore, TextRasterizer};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Build the export pipeline from the image and font settings
pub fn build_pipeline(config: &AppConfig) -> Result<ExportPipeline> {
    let loader = HttpImageLoader::with_limits(
        config.images.fetch_timeout(),
        config.images.max_remote_bytes,
    )
    .context("Failed to create image loader")?;
    let text = TextRasterizer::with_font_dirs(config.fonts.extra_dirs.clone());
    Ok(ExportPipeline::new(Arc::new(loader), Arc::new(text)))
}

/// Build the main router with all endpoints
pub fn build_router(config: &AppConfig, state: CanvasState) -> Router {
    let app = api_router_with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Static front-end (optional)
    let static_dir = Path::new(&config.server.static_dir);
    if static_dir.is_dir() {
        info!("Static assets enabled: serving from {}", static_dir.display());
        app.fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
    } else {
        app
    }
}

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Easel canvas server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded");

    validate_config(&config)?;

    let store = Arc::new(
        SceneStore::new(
            i64::from(config.canvas.default_width),
            i64::from(config.canvas.default_height),
        )
        .context("Failed to create scene store")?,
    );
    info!(
        "Canvas ready: {}x{}",
        config.canvas.default_width, config.canvas.default_height
    );

    let limits = CanvasLimits {
        min_dimension: config.canvas.min_dimension,
        max_dimension: config.canvas.max_dimension,
        max_upload_bytes: config.canvas.max_upload_bytes,
    };
    let state = CanvasState::new(store, build_pipeline(&config)?, limits);
    let app = build_router(&config, state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Easel shutdown complete");
    Ok(())
}
