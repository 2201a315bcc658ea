//! Raster surface backed by a tiny-skia pixmap
//!
//! Shapes are painted as anti-aliased paths, text goes through the shared
//! [`TextRasterizer`], and images are resampled with the `image` crate before
//! being composited.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;
use tiny_skia::{
    ColorU8, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::surface::{FontSpec, Rect, Surface};
use crate::text::TextRasterizer;

/// Surface that paints into an in-memory RGBA pixmap
pub struct PixmapSurface {
    pixmap: Pixmap,
    text: Arc<TextRasterizer>,
}

impl PixmapSurface {
    /// Create a transparent surface of the given size
    pub fn new(width: u32, height: u32, text: Arc<TextRasterizer>) -> Result<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            text,
        })
    }

    /// Surface width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Read back one pixel with alpha un-premultiplied
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Pixels as packed RGB triples, row-major, alpha dropped
    #[must_use]
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixmap.pixels().len() * 3);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        rgb
    }

    /// Encode the surface as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::Internal(format!("png encoding failed: {e}")))
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        paint
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, color: Color, line_width: f32) {
        let stroke = Stroke {
            width: line_width,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            path,
            &Self::paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| Error::Internal(format!("cannot allocate {width}x{height} surface")))
}

impl Surface for PixmapSurface {
    fn reset(&mut self, width: u32, height: u32, background: Color) -> Result<()> {
        if self.pixmap.width() != width || self.pixmap.height() != height {
            self.pixmap = allocate(width, height)?;
        }
        self.pixmap.fill(background.to_skia());
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = rect.to_skia() else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &Self::paint(color), Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let Some(rect) = rect.to_skia() else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        self.stroke_path(&path, color, line_width);
    }

    fn fill_ellipse(&mut self, bounds: Rect, color: Color) {
        let Some(path) = bounds.to_skia().and_then(PathBuilder::from_oval) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &Self::paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_ellipse(&mut self, bounds: Rect, color: Color, line_width: f32) {
        let Some(path) = bounds.to_skia().and_then(PathBuilder::from_oval) else {
            return;
        };
        self.stroke_path(&path, color, line_width);
    }

    fn draw_baseline_text(
        &mut self,
        text: &str,
        x: f32,
        baseline_y: f32,
        font: &FontSpec,
        color: Color,
    ) {
        self.text
            .draw(&mut self.pixmap, text, x, baseline_y, font, color);
    }

    fn draw_image_stretched(&mut self, image: &RgbaImage, dest: Rect) {
        let width = dest.width.round().max(1.0) as u32;
        let height = dest.height.round().max(1.0) as u32;
        let resized = if image.dimensions() == (width, height) {
            image.clone()
        } else {
            imageops::resize(image, width, height, FilterType::Triangle)
        };

        let Some(mut layer) = Pixmap::new(width, height) else {
            return;
        };
        for (dst, src) in layer.pixels_mut().iter_mut().zip(resized.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        self.pixmap.draw_pixmap(
            dest.x.round() as i32,
            dest.y.round() as i32,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}
