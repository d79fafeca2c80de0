use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::schema::Scene;

/// Read a scene manifest from disk, parse the YAML, and validate it.
pub fn load_and_validate_scene(path: &Path) -> Result<Scene> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    let scene: Scene = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })?;

    scene
        .validate()
        .with_context(|| format!("failed validating scene {}", path.display()))?;
    Ok(scene)
}

/// Directory the scene's relative paths (frame dirs, font file) resolve
/// against.
pub fn scene_dir(scene_path: &Path) -> PathBuf {
    scene_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Resolve a possibly-relative scene asset path against the scene dir.
pub fn resolve_scene_path(scene_path: &Path, asset: &Path) -> PathBuf {
    if asset.is_absolute() {
        asset.to_path_buf()
    } else {
        scene_dir(scene_path).join(asset)
    }
}

/// The hero frame sequence with its directories resolved against the
/// scene location, ready to hand to a frame store.
pub fn resolved_sequence(scene: &Scene, scene_path: &Path) -> crate::schema::FrameSequence {
    let mut sequence = scene.hero.frames.clone();
    sequence.compact_dir = resolve_scene_path(scene_path, &sequence.compact_dir);
    sequence.regular_dir = resolve_scene_path(scene_path, &sequence.regular_dir);
    sequence
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load_and_validate_scene, resolve_scene_path};

    const VALID_SCENE: &str = r#"
hero:
  frames:
    file_prefix: frame-
    compact_dir: assets/mobile
    regular_dir: assets/web
overlays:
  - start: 0.25
    end: 0.4
    text: The journey begins
    subtext: with the cherry.
    alignment: left
"#;

    #[test]
    fn loads_a_valid_scene() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("scene.yaml");
        fs::write(&path, VALID_SCENE).expect("scene should write");

        let scene = load_and_validate_scene(&path).expect("scene should load");
        assert_eq!(scene.overlays.len(), 1);
    }

    #[test]
    fn parse_errors_carry_the_location() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("scene.yaml");
        fs::write(&path, "hero: [not-a-mapping").expect("scene should write");

        let error = load_and_validate_scene(&path).expect_err("load should fail");
        assert!(error.to_string().contains("failed to parse yaml"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = load_and_validate_scene(std::path::Path::new("/nonexistent/scene.yaml"))
            .expect_err("load should fail");
        assert!(error.to_string().contains("failed to read scene"));
    }

    #[test]
    fn relative_assets_resolve_against_the_scene_dir() {
        let resolved = resolve_scene_path(
            std::path::Path::new("/site/scene.yaml"),
            std::path::Path::new("assets/web"),
        );
        assert_eq!(resolved, std::path::PathBuf::from("/site/assets/web"));

        let absolute = resolve_scene_path(
            std::path::Path::new("/site/scene.yaml"),
            std::path::Path::new("/elsewhere/web"),
        );
        assert_eq!(absolute, std::path::PathBuf::from("/elsewhere/web"));
    }
}
