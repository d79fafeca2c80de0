use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::viewport::DeviceClass;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub hero: Hero,
    #[serde(default)]
    pub typography: Option<Typography>,
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub footer: Option<Footer>,
}

impl Scene {
    pub fn validate(&self) -> Result<()> {
        self.hero.validate()?;

        if let Some(typography) = &self.typography {
            typography.validate()?;
        }

        for (index, overlay) in self.overlays.iter().enumerate() {
            overlay
                .validate()
                .map_err(|error| anyhow::anyhow!("overlay #{}: {error}", index + 1))?;
        }

        let mut seen_ids = Vec::new();
        for section in &self.sections {
            section.validate()?;
            if seen_ids.contains(&section.id()) {
                bail!("duplicate section id '{}'", section.id());
            }
            seen_ids.push(section.id());
        }

        for overlay in &self.overlays {
            if let Some(cta) = &overlay.cta {
                if !seen_ids.contains(&cta.target.as_str()) {
                    bail!(
                        "overlay '{}' call-to-action targets unknown section '{}'",
                        overlay.text,
                        cta.target
                    );
                }
            }
        }

        if let Some(footer) = &self.footer {
            footer.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub frames: FrameSequence,
    /// Logical-pixel width below which the compact frame set is used.
    #[serde(default = "default_breakpoint")]
    pub compact_breakpoint: u32,
    /// Scroll region height in viewport-height multiples.
    #[serde(default = "default_scroll_length")]
    pub scroll_length: f32,
    /// Uniform zoom applied on top of object-cover placement. The source
    /// imagery carries a border artifact along its edges; the zoom crops
    /// it out.
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default = "default_background")]
    pub background: ColorRgba,
}

impl Hero {
    pub fn validate(&self) -> Result<()> {
        self.frames.validate()?;

        if self.compact_breakpoint == 0 {
            bail!("hero.compact_breakpoint must be > 0");
        }
        if !self.scroll_length.is_finite() || self.scroll_length <= 1.0 {
            bail!(
                "hero.scroll_length must be > 1 viewport height, got {}",
                self.scroll_length
            );
        }
        if !self.zoom.is_finite() || self.zoom < 1.0 {
            bail!("hero.zoom must be >= 1, got {}", self.zoom);
        }
        self.background.validate("hero.background")?;
        Ok(())
    }
}

/// Naming convention for one ordered image sequence, with a parallel
/// directory per device class. Frame files are 1-based and zero-padded to
/// three digits: `<prefix>001.<ext>` through `<prefix>NNN.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameSequence {
    #[serde(default = "default_frame_count")]
    pub count: u32,
    pub file_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    pub compact_dir: PathBuf,
    pub regular_dir: PathBuf,
}

impl FrameSequence {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            bail!("hero.frames.count must be > 0");
        }
        if self.count > 999 {
            bail!(
                "hero.frames.count must fit the 3-digit naming convention, got {}",
                self.count
            );
        }
        if self.file_prefix.trim().is_empty() {
            bail!("hero.frames.file_prefix cannot be empty");
        }
        if self.extension.trim().is_empty() || self.extension.starts_with('.') {
            bail!(
                "hero.frames.extension must be a bare extension like 'jpg', got '{}'",
                self.extension
            );
        }
        Ok(())
    }

    pub fn class_dir(&self, class: DeviceClass) -> &Path {
        match class {
            DeviceClass::Compact => &self.compact_dir,
            DeviceClass::Regular => &self.regular_dir,
        }
    }

    /// Path of the 1-based `index`th frame for a device class.
    pub fn frame_path(&self, class: DeviceClass, index: u32) -> PathBuf {
        self.class_dir(class)
            .join(format!("{}{:03}.{}", self.file_prefix, index, self.extension))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Typography {
    /// TrueType/OpenType font used for overlay text, relative to the scene
    /// manifest unless absolute.
    pub font_file: PathBuf,
    #[serde(default = "default_title_size")]
    pub title_size: f32,
    #[serde(default = "default_subtext_size")]
    pub subtext_size: f32,
    #[serde(default = "default_hint_size")]
    pub hint_size: f32,
    #[serde(default = "default_text_color")]
    pub text_color: ColorRgba,
    /// Used for accent-flagged overlay titles and the call-to-action pill.
    #[serde(default = "default_accent_color")]
    pub accent_color: ColorRgba,
    /// Horizontal margin for left/right aligned overlays, logical pixels.
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default = "default_hint_label")]
    pub hint_label: String,
}

impl Typography {
    pub fn validate(&self) -> Result<()> {
        for (label, size) in [
            ("typography.title_size", self.title_size),
            ("typography.subtext_size", self.subtext_size),
            ("typography.hint_size", self.hint_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                bail!("{label} must be > 0, got {size}");
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            bail!("typography.margin must be >= 0, got {}", self.margin);
        }
        self.text_color.validate("typography.text_color")?;
        self.accent_color.validate("typography.accent_color")?;
        Ok(())
    }
}

/// One text overlay with an activation interval over scroll progress.
/// Intervals may overlap or leave gaps; overlays are computed
/// independently of each other.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    pub start: f32,
    pub end: f32,
    pub text: String,
    #[serde(default)]
    pub subtext: Option<String>,
    #[serde(default)]
    pub alignment: Alignment,
    /// Visible before any scrolling happens; such overlays skip the fade-in
    /// ramp and only fade out.
    #[serde(default)]
    pub show_on_load: bool,
    /// Render the title in the accent color instead of the text color.
    #[serde(default)]
    pub accent_text: bool,
    #[serde(default)]
    pub cta: Option<Cta>,
}

impl OverlaySpec {
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("start", self.start), ("end", self.end)] {
            if !value.is_finite() || value < 0.0 || value > 1.0 {
                bail!("{label} must be within [0, 1], got {value}");
            }
        }
        if self.start >= self.end {
            bail!(
                "interval start {} must be below end {}",
                self.start,
                self.end
            );
        }
        if self.text.trim().is_empty() {
            bail!("text cannot be empty");
        }
        if let Some(cta) = &self.cta {
            cta.validate()?;
        }
        Ok(())
    }

    pub fn is_cta(&self) -> bool {
        self.cta.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cta {
    pub label: String,
    /// Section id the call-to-action scrolls to.
    pub target: String,
}

impl Cta {
    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            bail!("call-to-action label cannot be empty");
        }
        if self.target.trim().is_empty() {
            bail!("call-to-action target cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Static page content below the hero. Data and validation only; layout
/// and styling live outside this crate.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Products {
        id: String,
        heading: String,
        #[serde(default)]
        intro: Option<String>,
        items: Vec<Product>,
    },
    Story {
        id: String,
        heading: String,
        paragraphs: Vec<String>,
        #[serde(default)]
        since: Option<Since>,
    },
}

impl Section {
    pub fn id(&self) -> &str {
        match self {
            Self::Products { id, .. } | Self::Story { id, .. } => id.as_str(),
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            Self::Products { heading, .. } | Self::Story { heading, .. } => heading.as_str(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id().trim().is_empty() {
            bail!("section id cannot be empty");
        }
        if self.heading().trim().is_empty() {
            bail!("section '{}' heading cannot be empty", self.id());
        }
        match self {
            Self::Products { id, items, .. } => {
                if items.is_empty() {
                    bail!("section '{id}' must list at least one product");
                }
                for product in items {
                    product
                        .validate()
                        .map_err(|error| anyhow::anyhow!("section '{id}': {error}"))?;
                }
            }
            Self::Story { id, paragraphs, .. } => {
                if paragraphs.iter().all(|paragraph| paragraph.trim().is_empty()) {
                    bail!("section '{id}' must have at least one paragraph");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub name: String,
    pub notes: String,
    pub intensity: Intensity,
    pub image: PathBuf,
}

impl Product {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("product name cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    Medium,
    Dark,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Since {
    pub year: u32,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Footer {
    pub brand: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub columns: Vec<FooterColumn>,
    pub legal: String,
}

impl Footer {
    pub fn validate(&self) -> Result<()> {
        if self.brand.trim().is_empty() {
            bail!("footer.brand cannot be empty");
        }
        for column in &self.columns {
            if column.heading.trim().is_empty() {
                bail!("footer column heading cannot be empty");
            }
            for link in &column.links {
                if link.label.trim().is_empty() {
                    bail!("footer column '{}' has an unlabeled link", column.heading);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FooterColumn {
    pub heading: String,
    pub links: Vec<FooterLink>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

impl ColorRgba {
    pub fn validate(&self, label: &str) -> Result<()> {
        for (channel, value) in [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)] {
            if !value.is_finite() || value < 0.0 || value > 1.0 {
                bail!("{label}.{channel} must be within [0, 1]");
            }
        }
        Ok(())
    }

    pub fn to_color(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba(self.r, self.g, self.b, self.a)
            .unwrap_or(tiny_skia::Color::BLACK)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (self.a * alpha).clamp(0.0, 1.0),
            ..self
        }
    }
}

fn default_alpha() -> f32 {
    1.0
}

fn default_frame_count() -> u32 {
    120
}

fn default_breakpoint() -> u32 {
    768
}

fn default_scroll_length() -> f32 {
    6.0
}

fn default_zoom() -> f32 {
    1.15
}

fn default_background() -> ColorRgba {
    // Cream, the brand background behind the drawing surface.
    ColorRgba {
        r: 0.961,
        g: 0.937,
        b: 0.886,
        a: 1.0,
    }
}

fn default_title_size() -> f32 {
    72.0
}

fn default_subtext_size() -> f32 {
    40.0
}

fn default_hint_size() -> f32 {
    13.0
}

fn default_text_color() -> ColorRgba {
    ColorRgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    }
}

fn default_accent_color() -> ColorRgba {
    // Coffee dark.
    ColorRgba {
        r: 0.239,
        g: 0.153,
        b: 0.106,
        a: 1.0,
    }
}

fn default_margin() -> f32 {
    96.0
}

fn default_hint_label() -> String {
    "Scroll to explore".to_owned()
}

fn default_extension() -> String {
    "jpg".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_scene() -> Scene {
        serde_yaml::from_str(
            r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: assets/mobile
    regular_dir: assets/web
overlays:
  - start: 0.0
    end: 0.15
    text: Brewed
    subtext: Pure Origin.
    show_on_load: true
"#,
        )
        .expect("scene should parse")
    }

    #[test]
    fn minimal_scene_validates_with_defaults() {
        let scene = minimal_scene();
        scene.validate().expect("scene should validate");
        assert_eq!(scene.hero.frames.count, 120);
        assert_eq!(scene.hero.compact_breakpoint, 768);
        assert_eq!(scene.hero.scroll_length, 6.0);
        assert_eq!(scene.hero.zoom, 1.15);
    }

    #[test]
    fn frame_paths_follow_zero_padded_convention() {
        let scene = minimal_scene();
        let path = scene.hero.frames.frame_path(DeviceClass::Compact, 7);
        assert_eq!(path, PathBuf::from("assets/mobile/frame-007.jpg"));
        let path = scene.hero.frames.frame_path(DeviceClass::Regular, 120);
        assert_eq!(path, PathBuf::from("assets/web/frame-120.jpg"));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let overlay: OverlaySpec = serde_yaml::from_str(
            r#"
start: 0.4
end: 0.25
text: backwards
"#,
        )
        .expect("overlay should parse");
        let error = overlay.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("below end"));
    }

    #[test]
    fn cta_target_must_reference_a_section() {
        let scene: Scene = serde_yaml::from_str(
            r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: m
    regular_dir: w
overlays:
  - start: 0.8
    end: 1.0
    text: Made just for you.
    cta:
      label: Explore Our Coffee
      target: explore
"#,
        )
        .expect("scene should parse");
        let error = scene.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("unknown section"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Scene, serde_yaml::Error> = serde_yaml::from_str(
            r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: m
    regular_dir: w
  unexpected: true
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_section_ids_are_rejected() {
        let scene: Scene = serde_yaml::from_str(
            r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: m
    regular_dir: w
sections:
  - kind: story
    id: story
    heading: Our Story
    paragraphs: [one]
  - kind: story
    id: story
    heading: Again
    paragraphs: [two]
"#,
        )
        .expect("scene should parse");
        let error = scene.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("duplicate section id"));
    }
}
