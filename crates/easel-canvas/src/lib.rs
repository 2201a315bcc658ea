//! Easel Canvas - scene model and rendering pipeline
//!
//! This crate holds everything about the canvas that is independent of HTTP:
//! - Scene: element model (rectangles, circles, text, images)
//! - Store: the lock-guarded, process-wide scene
//! - Surface: drawing primitives a render target provides
//! - Renderer: paints a scene snapshot onto any surface
//! - Raster: tiny-skia backed surface with PNG encoding
//! - Loader: remote image fetching with timeout and size cap
//! - Export: PNG preview and single-page PDF export
//! - Error: Error types for canvas operations
//!
//! ## Usage
//!
//! ```ignore
//! use easel_canvas::{ExportPipeline, HttpImageLoader, NewElement, SceneStore, TextRasterizer};
//! use std::sync::Arc;
//!
//! let store = SceneStore::new(800, 600)?;
//! store.append(NewElement::circle(0, 0, 50)).await?;
//!
//! let pipeline = ExportPipeline::new(
//!     Arc::new(HttpImageLoader::new()?),
//!     Arc::new(TextRasterizer::new()),
//! );
//! let pdf = pipeline.export_pdf(&store.snapshot().await).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod color;
pub mod error;
pub mod export;
pub mod imaging;
pub mod loader;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod store;
pub mod surface;
pub mod text;

// Re-export main types
pub use color::Color;
pub use error::{Error, Result};
pub use export::{encode_pdf, ExportPipeline, PDF_FILENAME};
pub use loader::{resolve_remote_images, HttpImageLoader, ImageLoader, ResolvedImages};
pub use raster::PixmapSurface;
pub use renderer::render_scene;
pub use scene::{Element, ElementId, ImageSource, NewElement, Scene, Shape};
pub use store::SceneStore;
pub use surface::{FontSpec, Rect, Surface};
pub use text::TextRasterizer;
