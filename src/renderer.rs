//! Frame drawing.
//!
//! The renderer owns a CPU surface sized to the viewport times the device
//! pixel ratio and remembers the last frame index it drew. A tick only
//! redraws when the integer index changed; resize and sequence-ready force
//! a redraw regardless. A frame whose load failed is skipped silently for
//! that tick.

use anyhow::{anyhow, Result};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::frames::FrameStore;
use crate::schema::ColorRgba;
use crate::scroll::frame_index;
use crate::viewport::Viewport;

/// Where a frame lands on the surface under object-cover semantics.
/// Offsets are typically negative: the image overflows the surface and the
/// overflow is cropped evenly on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    pub draw_width: f32,
    pub draw_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Object-cover placement with a uniform extra `zoom`. The dimension that
/// would letterbox is scaled up to fill; the other follows the image's
/// native aspect ratio; the result is centered on both axes.
pub fn cover_placement(
    image_width: f32,
    image_height: f32,
    surface_width: f32,
    surface_height: f32,
    zoom: f32,
) -> CoverPlacement {
    let image_aspect = image_width / image_height;
    let surface_aspect = surface_width / surface_height;

    let (draw_width, draw_height) = if image_aspect > surface_aspect {
        // Image is wider: fit to height, crop the sides.
        let draw_height = surface_height * zoom;
        (draw_height * image_aspect, draw_height)
    } else {
        // Image is taller: fit to width, crop top and bottom.
        let draw_width = surface_width * zoom;
        (draw_width, draw_width / image_aspect)
    };

    CoverPlacement {
        draw_width,
        draw_height,
        offset_x: (surface_width - draw_width) / 2.0,
        offset_y: (surface_height - draw_height) / 2.0,
    }
}

pub struct FrameRenderer {
    surface: Pixmap,
    viewport: Viewport,
    background: ColorRgba,
    zoom: f32,
    last_drawn: Option<u32>,
}

impl FrameRenderer {
    pub fn new(viewport: Viewport, background: ColorRgba, zoom: f32) -> Result<Self> {
        let surface = Pixmap::new(viewport.physical_width(), viewport.physical_height())
            .ok_or_else(|| {
                anyhow!(
                    "cannot allocate a {}x{} surface",
                    viewport.physical_width(),
                    viewport.physical_height()
                )
            })?;
        Ok(Self {
            surface,
            viewport,
            background,
            zoom,
            last_drawn: None,
        })
    }

    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_drawn(&self) -> Option<u32> {
        self.last_drawn
    }

    /// One display-refresh tick: map progress to a frame index and redraw
    /// only if it differs from the last-drawn index. Returns whether a
    /// draw happened.
    pub fn tick(&mut self, progress: f32, store: &FrameStore) -> bool {
        let index = frame_index(progress, store.frame_count());
        if self.last_drawn == Some(index) {
            return false;
        }
        self.last_drawn = Some(index);
        self.draw(index, store);
        true
    }

    /// Eager first paint of frame 0, done once the sequence becomes ready
    /// and before the continuous loop starts.
    pub fn draw_initial(&mut self, store: &FrameStore) {
        self.last_drawn = Some(0);
        self.draw(0, store);
    }

    /// Resize the surface to a new viewport and unconditionally redraw the
    /// last-drawn frame.
    pub fn resize(&mut self, viewport: Viewport, store: &FrameStore) -> Result<()> {
        self.viewport = viewport;
        self.surface = Pixmap::new(viewport.physical_width(), viewport.physical_height())
            .ok_or_else(|| {
                anyhow!(
                    "cannot allocate a {}x{} surface",
                    viewport.physical_width(),
                    viewport.physical_height()
                )
            })?;
        self.redraw(store);
        Ok(())
    }

    /// Redraw the last-drawn frame (no-op before the first draw).
    pub fn redraw(&mut self, store: &FrameStore) {
        if let Some(index) = self.last_drawn {
            self.draw(index, store);
        }
    }

    fn draw(&mut self, index: u32, store: &FrameStore) {
        // A frame that failed to load leaves a gap, not an error.
        let Some(frame) = store.frame(index) else {
            return;
        };

        self.surface.fill(self.background.to_color());

        let placement = cover_placement(
            frame.width() as f32,
            frame.height() as f32,
            self.surface.width() as f32,
            self.surface.height() as f32,
            self.zoom,
        );
        let scale_x = placement.draw_width / frame.width() as f32;
        let scale_y = placement.draw_height / frame.height() as f32;
        let transform = Transform::from_row(
            scale_x,
            0.0,
            0.0,
            scale_y,
            placement.offset_x,
            placement.offset_y,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.surface
            .draw_pixmap(0, 0, frame.as_ref(), &paint, transform, None);
    }
}

#[cfg(test)]
mod tests {
    use super::{cover_placement, FrameRenderer};
    use crate::frames::{Frame, FrameStore};
    use crate::schema::{ColorRgba, FrameSequence};
    use crate::viewport::{DeviceClass, Viewport};

    const WHITE: ColorRgba = ColorRgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    fn sequence(count: u32) -> FrameSequence {
        serde_yaml::from_str(&format!(
            "{{count: {count}, file_prefix: frame-, compact_dir: m, regular_dir: w}}"
        ))
        .expect("sequence should parse")
    }

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        let mut data = vec![value; (width * height * 4) as usize];
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        Frame::from_rgba8(width, height, data).expect("frame should build")
    }

    fn preloaded_store(count: u32) -> FrameStore {
        let frames = (0..count)
            .map(|index| Some(solid_frame(8, 6, (index * 16) as u8)))
            .collect();
        FrameStore::preloaded(sequence(count), DeviceClass::Regular, frames)
    }

    #[test]
    fn wide_image_fits_height_and_crops_sides() {
        let placement = cover_placement(200.0, 100.0, 100.0, 100.0, 1.0);
        assert_eq!(placement.draw_height, 100.0);
        assert_eq!(placement.draw_width, 200.0);
        assert_eq!(placement.offset_x, -50.0);
        assert_eq!(placement.offset_y, 0.0);
    }

    #[test]
    fn tall_image_fits_width_and_crops_vertically() {
        let placement = cover_placement(100.0, 200.0, 100.0, 100.0, 1.0);
        assert_eq!(placement.draw_width, 100.0);
        assert_eq!(placement.draw_height, 200.0);
        assert_eq!(placement.offset_x, 0.0);
        assert_eq!(placement.offset_y, -50.0);
    }

    #[test]
    fn zoom_scales_the_fitting_dimension() {
        let placement = cover_placement(100.0, 100.0, 100.0, 100.0, 1.15);
        assert!((placement.draw_width - 115.0).abs() < 1e-4);
        assert!((placement.draw_height - 115.0).abs() < 1e-4);
        assert!((placement.offset_x - -7.5).abs() < 1e-4);
        assert!((placement.offset_y - -7.5).abs() < 1e-4);
    }

    #[test]
    fn matching_aspects_still_cover_the_full_surface() {
        let placement = cover_placement(160.0, 90.0, 1600.0, 900.0, 1.0);
        assert!((placement.draw_width - 1600.0).abs() < 1e-3);
        assert!((placement.draw_height - 900.0).abs() < 1e-3);
    }

    #[test]
    fn same_index_ticks_draw_once() {
        let store = preloaded_store(120);
        let viewport = Viewport::new(100.0, 80.0, 1.0);
        let mut renderer = FrameRenderer::new(viewport, WHITE, 1.15).expect("renderer");

        // 0.001 and 0.002 both round to frame 0.
        assert!(renderer.tick(0.001, &store));
        assert!(!renderer.tick(0.002, &store));
        assert_eq!(renderer.last_drawn(), Some(0));

        assert!(renderer.tick(0.5, &store));
        assert_eq!(renderer.last_drawn(), Some(60));
    }

    #[test]
    fn initial_draw_then_first_tick_is_suppressed() {
        let store = preloaded_store(120);
        let mut renderer =
            FrameRenderer::new(Viewport::new(100.0, 80.0, 1.0), WHITE, 1.15).expect("renderer");

        renderer.draw_initial(&store);
        assert_eq!(renderer.last_drawn(), Some(0));
        assert!(!renderer.tick(0.0, &store));
    }

    #[test]
    fn missing_frame_is_skipped_without_erasing_state() {
        let frames = vec![Some(solid_frame(8, 6, 10)), None];
        let store = FrameStore::preloaded(sequence(2), DeviceClass::Regular, frames);
        let mut renderer =
            FrameRenderer::new(Viewport::new(10.0, 10.0, 1.0), WHITE, 1.0).expect("renderer");

        renderer.draw_initial(&store);
        // Ticking onto the missing frame counts as a draw decision but
        // leaves the surface untouched.
        assert!(renderer.tick(1.0, &store));
        assert_eq!(renderer.last_drawn(), Some(1));
    }

    #[test]
    fn resize_redraws_the_last_frame_at_the_new_size() {
        let store = preloaded_store(4);
        let mut renderer =
            FrameRenderer::new(Viewport::new(100.0, 80.0, 1.0), WHITE, 1.15).expect("renderer");
        renderer.tick(1.0, &store);

        renderer
            .resize(Viewport::new(50.0, 40.0, 2.0), &store)
            .expect("resize should succeed");
        assert_eq!(renderer.surface().width(), 100);
        assert_eq!(renderer.surface().height(), 80);
        assert_eq!(renderer.last_drawn(), Some(3));
    }

    #[test]
    fn drawn_surface_is_fully_covered() {
        // A mid-gray frame drawn with cover+zoom must leave no background
        // showing anywhere on the surface.
        let frames = vec![Some(solid_frame(16, 9, 100))];
        let store = FrameStore::preloaded(sequence(1), DeviceClass::Regular, frames);
        let mut renderer =
            FrameRenderer::new(Viewport::new(32.0, 32.0, 1.0), WHITE, 1.15).expect("renderer");
        renderer.draw_initial(&store);

        let white_pixels = renderer
            .surface()
            .pixels()
            .iter()
            .filter(|pixel| pixel.red() == 255 && pixel.green() == 255 && pixel.blue() == 255)
            .count();
        assert_eq!(white_pixels, 0);
    }
}
