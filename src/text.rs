//! Overlay text compositing.
//!
//! Rasterizes overlay titles, subtext, the call-to-action pill, and the
//! scroll hint onto the rendered frame. Typography is scene configuration;
//! a scene without a `typography` block still animates, it just composites
//! no text (overlay timing stays computable and reportable either way).

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fontdue::{Font, FontSettings};
use tiny_skia::{FillRule, Paint, Path as SkiaPath, PathBuilder, Pixmap, Shader, Stroke, Transform};

use crate::manifest::resolve_scene_path;
use crate::overlay::OverlayFrame;
use crate::schema::{Alignment, ColorRgba, Scene, Typography};
use crate::viewport::Viewport;

const LINE_SPACING: f32 = 1.2;
const SUBTEXT_ALPHA: f32 = 0.9;
const CTA_PADDING_X: f32 = 32.0;
const CTA_PADDING_Y: f32 = 16.0;
const CTA_GAP: f32 = 32.0;
const CTA_TRACKING: f32 = 0.1;
const HINT_BOTTOM_MARGIN: f32 = 32.0;
const HINT_CAPSULE_WIDTH: f32 = 24.0;
const HINT_CAPSULE_HEIGHT: f32 = 40.0;
const HINT_ALPHA: f32 = 0.6;

pub struct TextCompositor {
    font: Font,
    typography: Typography,
}

impl TextCompositor {
    /// Build the compositor for a scene, or `None` when the scene carries
    /// no typography block.
    pub fn from_scene(scene: &Scene, scene_path: &Path) -> Result<Option<Self>> {
        let Some(typography) = scene.typography.clone() else {
            return Ok(None);
        };
        let font_path = resolve_scene_path(scene_path, &typography.font_file);
        let bytes = fs::read(&font_path)
            .with_context(|| format!("failed to read font {}", font_path.display()))?;
        Self::new(bytes, typography).map(Some)
    }

    pub fn new(font_bytes: Vec<u8>, typography: Typography) -> Result<Self> {
        let font = Font::from_bytes(font_bytes, FontSettings::default())
            .map_err(|error| anyhow!("failed to parse overlay font: {error}"))?;
        Ok(Self { font, typography })
    }

    /// Draw every visible overlay (and the scroll hint) over the frame.
    pub fn composite(
        &self,
        surface: &mut Pixmap,
        viewport: Viewport,
        overlays: &[OverlayFrame<'_>],
        hint_visible: bool,
    ) {
        for state in overlays {
            if state.is_visible() {
                self.draw_overlay(surface, viewport, state);
            }
        }
        if hint_visible {
            self.draw_scroll_hint(surface, viewport);
        }
    }

    fn draw_overlay(&self, surface: &mut Pixmap, viewport: Viewport, state: &OverlayFrame<'_>) {
        let spec = state.spec;
        let opacity = state.opacity.clamp(0.0, 1.0);
        let scale = viewport.scale;
        let surface_width = surface.width() as f32;
        let surface_height = surface.height() as f32;
        let margin = self.typography.margin * scale;

        let title_size = self.typography.title_size * scale;
        let subtext_size = self.typography.subtext_size * scale;
        let cta_label_size = self.typography.subtext_size * 0.4 * scale;
        let pill_height = cta_label_size + 2.0 * CTA_PADDING_Y * scale;

        let mut block_height = title_size * LINE_SPACING;
        if spec.subtext.is_some() {
            block_height += subtext_size * LINE_SPACING;
        }
        if spec.cta.is_some() {
            block_height += CTA_GAP * scale + pill_height;
        }

        let mut cursor_y = (surface_height - block_height) / 2.0;

        let title_color = if spec.accent_text {
            self.typography.accent_color
        } else {
            self.typography.text_color
        };
        let title_width = self.measure(&spec.text, title_size, 0.0);
        let title_x = align_x(spec.alignment, surface_width, title_width, margin);
        let title_baseline = cursor_y + self.ascent(title_size);
        self.draw_text(
            surface,
            &spec.text,
            title_x,
            title_baseline,
            title_size,
            title_color,
            opacity,
            0.0,
        );
        cursor_y += title_size * LINE_SPACING;

        if let Some(subtext) = &spec.subtext {
            let color = self.typography.text_color.with_alpha(SUBTEXT_ALPHA);
            let width = self.measure(subtext, subtext_size, 0.0);
            let x = align_x(spec.alignment, surface_width, width, margin);
            let baseline = cursor_y + self.ascent(subtext_size);
            self.draw_text(
                surface, subtext, x, baseline, subtext_size, color, opacity, 0.0,
            );
            cursor_y += subtext_size * LINE_SPACING;
        }

        if let Some(cta) = &spec.cta {
            let label = cta.label.to_uppercase();
            let tracking = cta_label_size * CTA_TRACKING;
            let label_width = self.measure(&label, cta_label_size, tracking);
            let pill_width = label_width + 2.0 * CTA_PADDING_X * scale;
            let pill_x = align_x(spec.alignment, surface_width, pill_width, margin);
            let pill_y = cursor_y + CTA_GAP * scale;

            if let Some(path) =
                rounded_rect(pill_x, pill_y, pill_width, pill_height, pill_height / 2.0)
            {
                fill_path(
                    surface,
                    &path,
                    self.typography.accent_color.with_alpha(opacity),
                );
            }

            let label_x = pill_x + CTA_PADDING_X * scale;
            let label_baseline =
                pill_y + (pill_height - cta_label_size) / 2.0 + self.ascent(cta_label_size) * 0.9;
            self.draw_text(
                surface,
                &label,
                label_x,
                label_baseline,
                cta_label_size,
                self.typography.text_color,
                opacity,
                tracking,
            );
        }
    }

    fn draw_scroll_hint(&self, surface: &mut Pixmap, viewport: Viewport) {
        let scale = viewport.scale;
        let surface_width = surface.width() as f32;
        let surface_height = surface.height() as f32;

        let hint_size = self.typography.hint_size * scale;
        let label = self.typography.hint_label.to_uppercase();
        let tracking = hint_size * CTA_TRACKING;
        let label_width = self.measure(&label, hint_size, tracking);

        let capsule_width = HINT_CAPSULE_WIDTH * scale;
        let capsule_height = HINT_CAPSULE_HEIGHT * scale;
        let capsule_y = surface_height - (HINT_BOTTOM_MARGIN * scale + capsule_height);
        let capsule_x = (surface_width - capsule_width) / 2.0;

        let label_baseline = capsule_y - hint_size * 0.6;
        let label_x = (surface_width - label_width) / 2.0;
        let color = self.typography.text_color.with_alpha(HINT_ALPHA);
        self.draw_text(
            surface,
            &label,
            label_x,
            label_baseline,
            hint_size,
            color,
            1.0,
            tracking,
        );

        if let Some(path) = rounded_rect(
            capsule_x,
            capsule_y,
            capsule_width,
            capsule_height,
            capsule_width / 2.0,
        ) {
            stroke_path(surface, &path, color, 2.0 * scale);
        }

        let mut dot = PathBuilder::new();
        dot.push_circle(
            capsule_x + capsule_width / 2.0,
            capsule_y + capsule_height * 0.3,
            2.0 * scale,
        );
        if let Some(dot) = dot.finish() {
            fill_path(surface, &dot, color);
        }
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|metrics| metrics.ascent)
            .unwrap_or(size * 0.8)
    }

    fn measure(&self, text: &str, size: f32, tracking: f32) -> f32 {
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.font.metrics(ch, size).advance_width + tracking;
        }
        (width - tracking).max(0.0)
    }

    fn draw_text(
        &self,
        surface: &mut Pixmap,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: ColorRgba,
        opacity: f32,
        tracking: f32,
    ) {
        let mut pen_x = x;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, size);
            let glyph_x = pen_x as i32 + metrics.xmin;
            let glyph_top = baseline as i32 - metrics.ymin - metrics.height as i32;

            for row in 0..metrics.height {
                for column in 0..metrics.width {
                    let level = coverage[row * metrics.width + column];
                    if level == 0 {
                        continue;
                    }
                    let alpha = (level as f32 / 255.0) * opacity * color.a;
                    blend_pixel(
                        surface,
                        glyph_x + column as i32,
                        glyph_top + row as i32,
                        color,
                        alpha,
                    );
                }
            }
            pen_x += metrics.advance_width + tracking;
        }
    }
}

fn align_x(alignment: Alignment, surface_width: f32, content_width: f32, margin: f32) -> f32 {
    match alignment {
        Alignment::Left => margin,
        Alignment::Center => (surface_width - content_width) / 2.0,
        Alignment::Right => surface_width - margin - content_width,
    }
}

/// Source-over blend of a straight-alpha color onto the premultiplied
/// surface.
fn blend_pixel(surface: &mut Pixmap, x: i32, y: i32, color: ColorRgba, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let width = surface.width() as i32;
    let height = surface.height() as i32;
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }

    let index = ((y * width + x) * 4) as usize;
    let alpha = alpha.min(1.0);
    let inverse = 1.0 - alpha;
    let data = surface.data_mut();
    for (channel, value) in [color.r, color.g, color.b].into_iter().enumerate() {
        let source = value * alpha * 255.0;
        data[index + channel] =
            (source + data[index + channel] as f32 * inverse).round().min(255.0) as u8;
    }
    data[index + 3] =
        (alpha * 255.0 + data[index + 3] as f32 * inverse).round().min(255.0) as u8;
}

fn fill_path(surface: &mut Pixmap, path: &SkiaPath, color: ColorRgba) {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    paint.shader = Shader::SolidColor(color.to_color());
    surface.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn stroke_path(surface: &mut Pixmap, path: &SkiaPath, color: ColorRgba, width: f32) {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    paint.shader = Shader::SolidColor(color.to_color());
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    surface.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

fn rounded_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<SkiaPath> {
    let radius = radius.min(width / 2.0).min(height / 2.0);
    if width <= 0.0 || height <= 0.0 || radius < 0.0 {
        return None;
    }
    // Circular corners approximated with cubics.
    const K: f32 = 0.552_284_8;
    let handle = radius * K;

    let mut builder = PathBuilder::new();
    builder.move_to(x + radius, y);
    builder.line_to(x + width - radius, y);
    builder.cubic_to(
        x + width - radius + handle,
        y,
        x + width,
        y + radius - handle,
        x + width,
        y + radius,
    );
    builder.line_to(x + width, y + height - radius);
    builder.cubic_to(
        x + width,
        y + height - radius + handle,
        x + width - radius + handle,
        y + height,
        x + width - radius,
        y + height,
    );
    builder.line_to(x + radius, y + height);
    builder.cubic_to(
        x + radius - handle,
        y + height,
        x,
        y + height - radius + handle,
        x,
        y + height - radius,
    );
    builder.line_to(x, y + radius);
    builder.cubic_to(x, y + radius - handle, x + radius - handle, y, x + radius, y);
    builder.close();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::{align_x, blend_pixel, rounded_rect, TextCompositor};
    use crate::schema::{Alignment, ColorRgba, Scene};
    use tiny_skia::Pixmap;

    #[test]
    fn compositor_is_absent_without_typography() {
        let scene: Scene = serde_yaml::from_str(
            r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: m
    regular_dir: w
"#,
        )
        .expect("scene should parse");
        let compositor = TextCompositor::from_scene(&scene, std::path::Path::new("scene.yaml"))
            .expect("lookup should succeed");
        assert!(compositor.is_none());
    }

    #[test]
    fn alignment_places_content_within_margins() {
        assert_eq!(align_x(Alignment::Left, 1000.0, 200.0, 50.0), 50.0);
        assert_eq!(align_x(Alignment::Center, 1000.0, 200.0, 50.0), 400.0);
        assert_eq!(align_x(Alignment::Right, 1000.0, 200.0, 50.0), 750.0);
    }

    #[test]
    fn blend_at_full_alpha_replaces_the_pixel() {
        let mut surface = Pixmap::new(2, 2).expect("pixmap");
        surface.fill(tiny_skia::Color::WHITE);
        let red = ColorRgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        blend_pixel(&mut surface, 0, 0, red, 1.0);
        let pixel = surface.pixels()[0];
        assert_eq!(pixel.red(), 255);
        assert_eq!(pixel.green(), 0);
        assert_eq!(pixel.alpha(), 255);
    }

    #[test]
    fn blend_at_zero_alpha_is_a_no_op() {
        let mut surface = Pixmap::new(2, 2).expect("pixmap");
        surface.fill(tiny_skia::Color::WHITE);
        let red = ColorRgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        blend_pixel(&mut surface, 0, 0, red, 0.0);
        let pixel = surface.pixels()[0];
        assert_eq!(pixel.red(), 255);
        assert_eq!(pixel.green(), 255);
    }

    #[test]
    fn blend_ignores_out_of_bounds_coordinates() {
        let mut surface = Pixmap::new(2, 2).expect("pixmap");
        let red = ColorRgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        blend_pixel(&mut surface, -1, 0, red, 1.0);
        blend_pixel(&mut surface, 2, 5, red, 1.0);
    }

    #[test]
    fn rounded_rect_builds_a_closed_path() {
        let path = rounded_rect(0.0, 0.0, 100.0, 40.0, 20.0).expect("path should build");
        let bounds = path.bounds();
        assert!(bounds.width() >= 99.0);
        assert!(bounds.height() >= 39.0);
    }

    #[test]
    fn degenerate_rounded_rect_is_rejected() {
        assert!(rounded_rect(0.0, 0.0, 0.0, 40.0, 8.0).is_none());
    }
}
