//! Overlay visibility and opacity over scroll progress.
//!
//! Every overlay is evaluated independently against the current progress;
//! overlapping intervals simply produce multiple visible overlays. Opacity
//! is a piecewise-linear ramp: in over the first `FADE_RANGE` of the
//! interval, hold at 1, out over the last `FADE_RANGE`. Overlays flagged
//! `show_on_load` skip the fade-in and are fully visible from progress 0.
//!
//! An interval narrower than `2 * FADE_RANGE` never reaches full opacity;
//! that is the accepted behavior of the linear formula.

use crate::schema::OverlaySpec;

/// Progress span of each fade ramp.
pub const FADE_RANGE: f32 = 0.03;

/// The scroll-affordance indicator is only shown this close to the top.
pub const SCROLL_HINT_THRESHOLD: f32 = 0.01;

/// One overlay paired with its computed opacity at some progress value.
#[derive(Debug, Clone, Copy)]
pub struct OverlayFrame<'a> {
    pub spec: &'a OverlaySpec,
    pub opacity: f32,
}

impl OverlayFrame<'_> {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Opacity of a single overlay at `progress`.
pub fn overlay_opacity(spec: &OverlaySpec, progress: f32) -> f32 {
    if spec.show_on_load {
        if progress > spec.end {
            return 0.0;
        }
        if progress > spec.end - FADE_RANGE {
            return (spec.end - progress) / FADE_RANGE;
        }
        return 1.0;
    }

    if progress < spec.start || progress > spec.end {
        return 0.0;
    }
    if progress < spec.start + FADE_RANGE {
        return (progress - spec.start) / FADE_RANGE;
    }
    if progress > spec.end - FADE_RANGE {
        return (spec.end - progress) / FADE_RANGE;
    }
    1.0
}

/// Evaluate every overlay at `progress`, preserving manifest order.
pub fn overlay_states<'a>(overlays: &'a [OverlaySpec], progress: f32) -> Vec<OverlayFrame<'a>> {
    overlays
        .iter()
        .map(|spec| OverlayFrame {
            spec,
            opacity: overlay_opacity(spec, progress),
        })
        .collect()
}

pub fn scroll_hint_visible(progress: f32) -> bool {
    progress < SCROLL_HINT_THRESHOLD
}
