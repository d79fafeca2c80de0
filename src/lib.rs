//! brewscroll: the scroll-scrubbed frame-sequence engine behind the
//! Brewed landing experience.
//!
//! A scene manifest names an ordered image sequence (one directory per
//! device class), a set of timed text overlays, and the static page
//! content. Scroll progress through a tall virtual region is mapped to a
//! frame index and drawn with object-cover-plus-zoom placement; overlay
//! opacity follows piecewise-linear fades over the same progress value.

pub mod frames;
pub mod manifest;
pub mod overlay;
#[cfg(feature = "play")]
pub mod play;
pub mod renderer;
pub mod schema;
pub mod scroll;
pub mod text;
pub mod viewport;
