//! Text rasterization
//!
//! Shapes and rasterizes text runs with cosmic-text on top of the system font
//! database. The font database is expensive to build, so it is created on
//! first use and shared behind a mutex.

use cosmic_text::{Attrs, Buffer, Color as TextColor, Family, FontSystem, Metrics, Shaping, SwashCache};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use tiny_skia::{Paint, Pixmap, Transform};
use tracing::{debug, info};

use crate::color::Color;
use crate::surface::FontSpec;

const LINE_HEIGHT: f32 = 1.2;

struct FontEngine {
    system: FontSystem,
    cache: SwashCache,
}

/// Shared text shaper and glyph rasterizer
pub struct TextRasterizer {
    extra_dirs: Vec<PathBuf>,
    engine: OnceLock<Mutex<FontEngine>>,
}

impl TextRasterizer {
    /// Rasterizer backed by the system fonts only
    #[must_use]
    pub fn new() -> Self {
        Self::with_font_dirs(Vec::new())
    }

    /// Rasterizer that also loads every font found in `dirs`
    #[must_use]
    pub fn with_font_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            extra_dirs: dirs,
            engine: OnceLock::new(),
        }
    }

    fn engine(&self) -> &Mutex<FontEngine> {
        self.engine.get_or_init(|| {
            let mut system = FontSystem::new();
            for dir in &self.extra_dirs {
                system.db_mut().load_fonts_dir(dir);
            }
            info!(faces = system.db().len(), "Font database loaded");
            Mutex::new(FontEngine {
                system,
                cache: SwashCache::new(),
            })
        })
    }

    /// Draw `text` onto `pixmap` with its first baseline at `(x, baseline_y)`
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        baseline_y: f32,
        font: &FontSpec,
        color: Color,
    ) {
        if text.is_empty() || font.size <= 0.0 || !color.is_visible() {
            return;
        }

        let mut guard = self.engine().lock().unwrap_or_else(PoisonError::into_inner);
        let FontEngine { system, cache } = &mut *guard;

        let metrics = Metrics::new(font.size, font.size * LINE_HEIGHT);
        let mut buffer = Buffer::new(system, metrics);
        buffer.set_size(system, None, None);
        let attrs = Attrs::new().family(family(&font.family));
        buffer.set_text(system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(system, false);

        let Some(first_baseline) = buffer.layout_runs().next().map(|run| run.line_y) else {
            debug!(text, "Text produced no layout runs");
            return;
        };
        let origin_y = baseline_y - first_baseline;

        let text_color = TextColor::rgba(color.r, color.g, color.b, color.a);
        let bounds = (pixmap.width(), pixmap.height());
        let mut paint = Paint::default();
        buffer.draw(system, cache, text_color, |gx, gy, w, h, coverage| {
            if coverage.a() == 0 {
                return;
            }
            let Some(rect) = visible_span(x + gx as f32, origin_y + gy as f32, w, h, bounds)
            else {
                return;
            };
            paint.set_color_rgba8(coverage.r(), coverage.g(), coverage.b(), coverage.a());
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        });
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Part of a glyph span that lands on a `width x height` pixmap
fn visible_span(
    x: f32,
    y: f32,
    w: u32,
    h: u32,
    (width, height): (u32, u32),
) -> Option<tiny_skia::Rect> {
    let left = x.max(0.0);
    let top = y.max(0.0);
    let right = (x + w as f32).min(width as f32);
    let bottom = (y + h as f32).min(height as f32);
    if right <= left || bottom <= top {
        return None;
    }
    tiny_skia::Rect::from_ltrb(left, top, right, bottom)
}

/// Map a CSS font-family value to a cosmic-text family, using the first entry
/// of a comma-separated list
fn family(css: &str) -> Family<'_> {
    let first = css
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');

    match first.to_ascii_lowercase().as_str() {
        "" | "sans-serif" | "system-ui" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(first),
    }
}
