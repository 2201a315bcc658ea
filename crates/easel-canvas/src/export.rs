//! Export pipeline
//!
//! Resolves remote images, paints the scene on the blocking pool and packages
//! the raster either as PNG (preview) or as a single-page PDF whose only
//! content is the full-bleed image.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::loader::{resolve_remote_images, ImageLoader, ResolvedImages};
use crate::raster::PixmapSurface;
use crate::renderer::render_scene;
use crate::scene::Scene;
use crate::text::TextRasterizer;

/// Attachment name used for PDF downloads
pub const PDF_FILENAME: &str = "canvas-export.pdf";

/// Renders snapshots to PNG or PDF bytes
#[derive(Clone)]
pub struct ExportPipeline {
    loader: Arc<dyn ImageLoader>,
    text: Arc<TextRasterizer>,
}

impl ExportPipeline {
    /// Create a pipeline from an image loader and a shared text rasterizer
    pub fn new(loader: Arc<dyn ImageLoader>, text: Arc<TextRasterizer>) -> Self {
        Self { loader, text }
    }

    /// Render the scene into a raster surface of the scene's size
    pub async fn rasterize(&self, scene: &Scene) -> Result<PixmapSurface> {
        let images = resolve_remote_images(scene, self.loader.as_ref()).await;
        let scene = scene.clone();
        let text = Arc::clone(&self.text);
        tokio::task::spawn_blocking(move || paint(&scene, &images, text)).await?
    }

    /// Render the scene and encode it as PNG
    pub async fn render_png(&self, scene: &Scene) -> Result<Vec<u8>> {
        let surface = self.rasterize(scene).await?;
        tokio::task::spawn_blocking(move || surface.encode_png()).await?
    }

    /// Render the scene and wrap it in a single-page PDF
    pub async fn export_pdf(&self, scene: &Scene) -> Result<Vec<u8>> {
        let surface = self.rasterize(scene).await?;
        let pdf = tokio::task::spawn_blocking(move || encode_pdf(&surface)).await??;

        info!(bytes = pdf.len(), "PDF exported");
        Ok(pdf)
    }
}

fn paint(scene: &Scene, images: &ResolvedImages, text: Arc<TextRasterizer>) -> Result<PixmapSurface> {
    let mut surface = PixmapSurface::new(scene.width, scene.height, text)?;
    render_scene(scene, images, &mut surface)?;
    Ok(surface)
}

/// Write a PDF with a `width x height` point page showing the surface as one
/// DeviceRGB image
pub fn encode_pdf(surface: &PixmapSurface) -> Result<Vec<u8>> {
    let width = i64::from(surface.width());
    let height = i64::from(surface.height());

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&surface.to_rgb8())
        .and_then(|_| encoder.flush())
        .map_err(|e| Error::export(format!("image compression failed: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::export(format!("image compression failed: {e}")))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed,
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => image_id,
        },
    });

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| Error::export(format!("pdf write failed: {e}")))?;
    debug!(width, height, bytes = out.len(), "PDF encoded");
    Ok(out)
}
