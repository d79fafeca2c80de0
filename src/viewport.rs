//! Viewport classification and surface sizing.
//!
//! The device class picks which frame directory is loaded. It is a pure
//! function of the current logical width; every resize re-evaluates it with
//! no debounce, so rapid crossings of the breakpoint re-trigger frame
//! reloads. The class only ever depends on the settled width.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Compact,
    Regular,
}

impl DeviceClass {
    /// Compact below the breakpoint, Regular at or above it. Widths are
    /// logical pixels, not physical.
    pub fn classify(width: f32, breakpoint: u32) -> Self {
        if width < breakpoint as f32 {
            Self::Compact
        } else {
            Self::Regular
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Regular => "regular",
        }
    }
}

/// Logical viewport size plus device pixel ratio. The drawing surface is
/// sized to `logical * scale` so output stays sharp on dense displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            scale: if scale.is_finite() && scale > 0.0 {
                scale
            } else {
                1.0
            },
        }
    }

    pub fn physical_width(&self) -> u32 {
        (self.width * self.scale).round().max(1.0) as u32
    }

    pub fn physical_height(&self) -> u32 {
        (self.height * self.scale).round().max(1.0) as u32
    }

    pub fn aspect(&self) -> f32 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}
