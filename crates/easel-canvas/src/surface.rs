//! Drawing surface capability
//!
//! The renderer only talks to this trait, so the same scene walk drives the
//! raster preview, the export buffer and test doubles.

use image::RgbaImage;

use crate::color::Color;

/// Axis-aligned box in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle from integer scene coordinates
    #[must_use]
    pub fn from_scene(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x as f32, y as f32, width as f32, height as f32)
    }

    pub(crate) fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Font selection for a text run
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// CSS-style family name or generic family
    pub family: String,
    /// Size in pixels
    pub size: f32,
}

impl FontSpec {
    /// Create a new font spec
    #[must_use]
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Primitive drawing operations a renderer target must provide
pub trait Surface {
    /// Resize to `width x height` and flood with `background`
    fn reset(&mut self, width: u32, height: u32, background: Color) -> crate::Result<()>;

    /// Fill the interior of a rectangle
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Stroke a rectangle outline centred on its edges
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    /// Fill the ellipse inscribed in `bounds`
    fn fill_ellipse(&mut self, bounds: Rect, color: Color);

    /// Stroke the ellipse inscribed in `bounds`
    fn stroke_ellipse(&mut self, bounds: Rect, color: Color, line_width: f32);

    /// Draw a text run whose baseline starts at `(x, baseline_y)`
    fn draw_baseline_text(&mut self, text: &str, x: f32, baseline_y: f32, font: &FontSpec, color: Color);

    /// Draw an image resampled to exactly fill `dest`
    fn draw_image_stretched(&mut self, image: &RgbaImage, dest: Rect);
}
