use std::fs;
use std::path::Path;
use std::process::Command;

use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

use brewscroll::frames::FrameStore;
use brewscroll::renderer::FrameRenderer;
use brewscroll::schema::Scene;
use brewscroll::viewport::{DeviceClass, Viewport};

const SCENE: &str = r#"
hero:
  frames:
    count: 3
    file_prefix: frame-
    extension: png
    compact_dir: frames
    regular_dir: frames
overlays:
  - start: 0.25
    end: 0.75
    text: Roasted for Depth.
"#;

fn write_fixture(root: &Path) {
    fs::create_dir_all(root.join("frames")).expect("frame dir should create");
    for index in 1..=3u32 {
        let shade = (index * 60) as u8;
        let image = RgbaImage::from_pixel(16, 9, Rgba([shade, shade / 2, 40, 255]));
        image
            .save(root.join(format!("frames/frame-{index:03}.png")))
            .expect("frame should write");
    }
    fs::write(root.join("scene.yaml"), SCENE).expect("scene should write");
}

fn sha256_of(path: &Path) -> String {
    let bytes = fs::read(path).expect("file should read");
    format!("{:x}", Sha256::digest(&bytes))
}

#[test]
fn cli_render_is_deterministic() {
    let dir = tempdir().expect("tempdir should create");
    write_fixture(dir.path());

    for output in ["first.png", "second.png"] {
        let status = Command::new(env!("CARGO_BIN_EXE_brewscroll"))
            .current_dir(dir.path())
            .args([
                "render",
                "scene.yaml",
                "--progress",
                "0.5",
                "--width",
                "64",
                "--height",
                "36",
                "-o",
                output,
            ])
            .status()
            .expect("render should run");
        assert!(status.success(), "render should succeed");
    }

    assert_eq!(
        sha256_of(&dir.path().join("first.png")),
        sha256_of(&dir.path().join("second.png")),
        "same scene and progress must produce identical stills"
    );
}

#[test]
fn library_render_is_deterministic() {
    let dir = tempdir().expect("tempdir should create");
    write_fixture(dir.path());

    let scene: Scene = serde_yaml::from_str(SCENE).expect("scene should parse");
    let sequence =
        brewscroll::manifest::resolved_sequence(&scene, &dir.path().join("scene.yaml"));

    let mut hashes = Vec::new();
    for _ in 0..2 {
        let mut store = FrameStore::start(sequence.clone(), DeviceClass::Regular);
        store.wait_ready().expect("load should finish");

        let viewport = Viewport::new(64.0, 36.0, 1.0);
        let mut renderer =
            FrameRenderer::new(viewport, scene.hero.background, scene.hero.zoom)
                .expect("renderer should build");
        renderer.tick(0.5, &store);
        hashes.push(format!("{:x}", Sha256::digest(renderer.surface().data())));
    }

    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn compact_flag_renders_from_the_compact_set() {
    let dir = tempdir().expect("tempdir should create");
    write_fixture(dir.path());

    let status = Command::new(env!("CARGO_BIN_EXE_brewscroll"))
        .current_dir(dir.path())
        .args([
            "render",
            "scene.yaml",
            "--compact",
            "--width",
            "64",
            "--height",
            "36",
            "-o",
            "compact.png",
        ])
        .status()
        .expect("render should run");
    assert!(status.success(), "render should succeed");
    assert!(dir.path().join("compact.png").exists());
}
