//! Scene renderer
//!
//! Walks a scene snapshot in paint order and issues surface primitives. The
//! renderer is synchronous and performs no I/O: remote images must already be
//! resolved into [`ResolvedImages`].

use tracing::{debug, warn};

use crate::color::Color;
use crate::error::Result;
use crate::imaging;
use crate::loader::ResolvedImages;
use crate::scene::{Element, ImageSource, Scene, Shape};
use crate::surface::{FontSpec, Rect, Surface};

/// Caption painted inside the image placeholder
pub const FALLBACK_CAPTION: &str = "Image failed to load";

/// Placeholder box colour
pub const FALLBACK_FILL: Color = Color::rgb(0xcc, 0xcc, 0xcc);

/// Placeholder caption colour
pub const FALLBACK_TEXT: Color = Color::rgb(0x66, 0x66, 0x66);

const FALLBACK_FONT_SIZE: f32 = 12.0;
const FALLBACK_CAPTION_OFFSET: (f32, f32) = (5.0, 20.0);

/// Paint `scene` onto `surface`, replacing whatever it held
pub fn render_scene<S: Surface + ?Sized>(
    scene: &Scene,
    images: &ResolvedImages,
    surface: &mut S,
) -> Result<()> {
    surface.reset(scene.width, scene.height, Color::WHITE)?;
    for element in &scene.elements {
        draw_element(element, images, surface);
    }
    debug!(
        width = scene.width,
        height = scene.height,
        elements = scene.elements.len(),
        "Scene rendered"
    );
    Ok(())
}

fn draw_element<S: Surface + ?Sized>(element: &Element, images: &ResolvedImages, surface: &mut S) {
    let (x, y) = (element.x, element.y);
    match &element.shape {
        Shape::Rectangle {
            width,
            height,
            fill_color,
            stroke_color,
            stroke_width,
        } => {
            let rect = Rect::from_scene(x, y, *width, *height);
            surface.fill_rect(rect, *fill_color);
            if *stroke_width > 0 {
                surface.stroke_rect(rect, *stroke_color, *stroke_width as f32);
            }
        }
        Shape::Circle {
            radius,
            fill_color,
            stroke_color,
            stroke_width,
        } => {
            let diameter = *radius as f32 * 2.0;
            let bounds = Rect::new(x as f32, y as f32, diameter, diameter);
            surface.fill_ellipse(bounds, *fill_color);
            if *stroke_width > 0 {
                surface.stroke_ellipse(bounds, *stroke_color, *stroke_width as f32);
            }
        }
        Shape::Text {
            text,
            font_size,
            font_family,
            color,
        } => {
            let font = FontSpec::new(font_family.as_str(), *font_size as f32);
            let baseline = y as f32 + *font_size as f32;
            surface.draw_baseline_text(text, x as f32, baseline, &font, *color);
        }
        Shape::Image {
            width,
            height,
            source,
        } => {
            let dest = Rect::from_scene(x, y, *width, *height);
            match source {
                ImageSource::Embedded { data } => match imaging::decode(data) {
                    Ok(decoded) => surface.draw_image_stretched(&decoded, dest),
                    Err(e) => {
                        warn!(id = %element.id, error = %e, "Embedded image unreadable");
                        draw_fallback(surface, dest);
                    }
                },
                ImageSource::Remote { .. } => match images.get(element.id) {
                    Some(decoded) => surface.draw_image_stretched(decoded, dest),
                    None => draw_fallback(surface, dest),
                },
            }
        }
    }
}

/// Gray box with a caption, used for any image that could not be loaded
fn draw_fallback<S: Surface + ?Sized>(surface: &mut S, dest: Rect) {
    surface.fill_rect(dest, FALLBACK_FILL);
    let (dx, dy) = FALLBACK_CAPTION_OFFSET;
    surface.draw_baseline_text(
        FALLBACK_CAPTION,
        dest.x + dx,
        dest.y + dy,
        &FontSpec::new("sans-serif", FALLBACK_FONT_SIZE),
        FALLBACK_TEXT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixmapSurface;
    use crate::scene::{ElementId, NewElement};
    use crate::text::TextRasterizer;
    use image::RgbaImage;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reset(u32, u32, Color),
        FillRect(Rect, Color),
        StrokeRect(Rect, Color, f32),
        FillEllipse(Rect, Color),
        StrokeEllipse(Rect, Color, f32),
        Text(String, f32, f32, FontSpec, Color),
        Image((u32, u32), Rect),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl Surface for RecordingSurface {
        fn reset(&mut self, width: u32, height: u32, background: Color) -> Result<()> {
            self.calls.push(Call::Reset(width, height, background));
            Ok(())
        }
        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(Call::FillRect(rect, color));
        }
        fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
            self.calls.push(Call::StrokeRect(rect, color, line_width));
        }
        fn fill_ellipse(&mut self, bounds: Rect, color: Color) {
            self.calls.push(Call::FillEllipse(bounds, color));
        }
        fn stroke_ellipse(&mut self, bounds: Rect, color: Color, line_width: f32) {
            self.calls.push(Call::StrokeEllipse(bounds, color, line_width));
        }
        fn draw_baseline_text(
            &mut self,
            text: &str,
            x: f32,
            baseline_y: f32,
            font: &FontSpec,
            color: Color,
        ) {
            self.calls
                .push(Call::Text(text.to_string(), x, baseline_y, font.clone(), color));
        }
        fn draw_image_stretched(&mut self, image: &RgbaImage, dest: Rect) {
            self.calls.push(Call::Image(image.dimensions(), dest));
        }
    }

    fn scene_with(drafts: Vec<NewElement>) -> Scene {
        let mut scene = Scene::new(200, 100).unwrap();
        for (i, draft) in drafts.into_iter().enumerate() {
            scene.elements.push(draft.into_element(ElementId(i as u64 + 1)));
        }
        scene
    }

    fn record(scene: &Scene, images: &ResolvedImages) -> Vec<Call> {
        let mut surface = RecordingSurface::default();
        render_scene(scene, images, &mut surface).unwrap();
        surface.calls
    }

    #[test]
    fn test_reset_then_fill_before_stroke() {
        let red = Color::rgb(255, 0, 0);
        let scene = scene_with(vec![NewElement::rectangle(10, 20, 30, 40)
            .with_fill(red)
            .with_stroke(Color::BLACK, 3)]);

        let calls = record(&scene, &ResolvedImages::empty());
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(
            calls,
            vec![
                Call::Reset(200, 100, Color::WHITE),
                Call::FillRect(rect, red),
                Call::StrokeRect(rect, Color::BLACK, 3.0),
            ]
        );
    }

    #[test]
    fn test_zero_stroke_width_skips_outline() {
        let scene = scene_with(vec![
            NewElement::rectangle(0, 0, 5, 5).with_stroke(Color::BLACK, 0),
            NewElement::circle(0, 0, 5).with_stroke(Color::BLACK, 0),
        ]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::StrokeRect(..) | Call::StrokeEllipse(..))));
    }

    #[test]
    fn test_circle_uses_bounding_box_at_position() {
        let scene = scene_with(vec![NewElement::circle(10, 20, 15)]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert_eq!(
            calls[1],
            Call::FillEllipse(Rect::new(10.0, 20.0, 30.0, 30.0), Color::BLACK)
        );
    }

    #[test]
    fn test_huge_radius_does_not_overflow() {
        let scene = scene_with(vec![NewElement::circle(0, 0, 3_000_000_000)]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert_eq!(
            calls[1],
            Call::FillEllipse(Rect::new(0.0, 0.0, 6.0e9, 6.0e9), Color::BLACK)
        );
    }

    #[test]
    fn test_text_baseline_is_offset_by_font_size() {
        let scene = scene_with(vec![NewElement::text(7, 30, "hello")]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert_eq!(
            calls[1],
            Call::Text(
                "hello".to_string(),
                7.0,
                46.0,
                FontSpec::new("Arial", 16.0),
                Color::BLACK
            )
        );
    }

    #[test]
    fn test_unresolved_remote_image_paints_fallback() {
        let scene = scene_with(vec![NewElement::image(
            10,
            10,
            60,
            40,
            ImageSource::remote("http://127.0.0.1:9/missing.png"),
        )]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert_eq!(
            &calls[1..],
            &[
                Call::FillRect(Rect::new(10.0, 10.0, 60.0, 40.0), FALLBACK_FILL),
                Call::Text(
                    FALLBACK_CAPTION.to_string(),
                    15.0,
                    30.0,
                    FontSpec::new("sans-serif", 12.0),
                    FALLBACK_TEXT
                ),
            ]
        );
    }

    #[test]
    fn test_resolved_remote_image_is_stretched() {
        let scene = scene_with(vec![NewElement::image(
            0,
            0,
            60,
            40,
            ImageSource::remote("http://example.com/a.png"),
        )]);
        let mut images = ResolvedImages::empty();
        images.insert(ElementId(1), RgbaImage::new(4, 3));

        let calls = record(&scene, &images);
        assert_eq!(calls[1], Call::Image((4, 3), Rect::new(0.0, 0.0, 60.0, 40.0)));
    }

    #[test]
    fn test_corrupt_embedded_image_paints_fallback() {
        let scene = scene_with(vec![NewElement::image(
            0,
            0,
            20,
            20,
            ImageSource::embedded(vec![0xde, 0xad]),
        )]);
        let calls = record(&scene, &ResolvedImages::empty());
        assert!(matches!(calls[1], Call::FillRect(_, c) if c == FALLBACK_FILL));
    }

    fn raster(scene: &Scene) -> PixmapSurface {
        let mut surface =
            PixmapSurface::new(1, 1, Arc::new(TextRasterizer::new())).unwrap();
        render_scene(scene, &ResolvedImages::empty(), &mut surface).unwrap();
        surface
    }

    #[test]
    fn test_empty_scene_is_white() {
        let surface = raster(&scene_with(Vec::new()));
        assert_eq!((surface.width(), surface.height()), (200, 100));
        assert_eq!(surface.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(surface.pixel(199, 99), Some(Color::WHITE));
    }

    #[test]
    fn test_later_element_wins_overlap() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let scene = scene_with(vec![
            NewElement::rectangle(0, 0, 60, 60).with_fill(red).with_stroke(red, 0),
            NewElement::rectangle(30, 30, 60, 60).with_fill(blue).with_stroke(blue, 0),
        ]);
        let surface = raster(&scene);
        assert_eq!(surface.pixel(10, 10), Some(red));
        assert_eq!(surface.pixel(45, 45), Some(blue));
        assert_eq!(surface.pixel(80, 80), Some(blue));
    }

    #[test]
    fn test_circle_centre_and_corner() {
        let green = Color::rgb(0, 128, 0);
        let scene = scene_with(vec![NewElement::circle(0, 0, 50)
            .with_fill(green)
            .with_stroke(green, 0)]);
        let surface = raster(&scene);
        assert_eq!(surface.pixel(50, 50), Some(green));
        assert_eq!(surface.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(surface.pixel(101, 50), Some(Color::WHITE));
    }

    #[test]
    fn test_fallback_box_is_gray() {
        let scene = scene_with(vec![NewElement::image(
            100,
            10,
            80,
            60,
            ImageSource::remote("http://127.0.0.1:9/missing.png"),
        )]);
        let surface = raster(&scene);
        // bottom-right corner of the box is clear of the caption
        assert_eq!(surface.pixel(175, 65), Some(FALLBACK_FILL));
        assert_eq!(surface.pixel(99, 10), Some(Color::WHITE));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let scene = scene_with(vec![
            NewElement::circle(20, 20, 30).with_fill(Color::rgb(10, 200, 30)),
            NewElement::rectangle(50, 10, 40, 70).with_stroke(Color::rgb(0, 0, 255), 4),
        ]);
        assert_eq!(raster(&scene).to_rgb8(), raster(&scene).to_rgb8());
    }
}
